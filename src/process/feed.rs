//! # Child activity intake.
//!
//! The platform hook that observes child owners is an external collaborator;
//! its boundary here is a stream of [`ChildSignal`]s. Feed them to the
//! aggregator either directly with [`ProcessAggregator::apply`] or through
//! the channel-driven [`ProcessAggregator::listen`] loop.
//!
//! ## Rules
//! - Per child instance the expected relative order is
//!   `Created → Started → Resumed → (Paused → Stopped)* → Destroyed`, with
//!   resume/pause cycles allowed before the final stop. The aggregator
//!   assumes, but does not enforce, this ordering.
//! - The listen loop exits when the channel closes or the token fires.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::aggregator::ProcessAggregator;

/// One child owner activity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSignal {
    /// The child was created.
    Created,
    /// The child was created, reporting its setup time.
    CreatedTimed(Duration),
    /// The child started.
    Started,
    /// The child finished its first setup.
    Ready,
    /// The child resumed.
    Resumed,
    /// The child paused.
    Paused,
    /// The child stopped.
    Stopped,
    /// The child was destroyed.
    Destroyed,
}

impl ProcessAggregator {
    /// Applies one child signal to the aggregator.
    pub fn apply(&self, signal: ChildSignal) {
        match signal {
            ChildSignal::Created => self.child_created(),
            ChildSignal::CreatedTimed(load_time) => self.child_created_timed(load_time),
            ChildSignal::Started => self.child_started(),
            ChildSignal::Ready => self.child_ready(),
            ChildSignal::Resumed => self.child_resumed(),
            ChildSignal::Paused => self.child_paused(),
            ChildSignal::Stopped => self.child_stopped(),
            ChildSignal::Destroyed => self.child_destroyed(),
        }
    }

    /// Drains child signals from `rx` until the channel closes or `token`
    /// is cancelled.
    ///
    /// Like every aggregator entry point this must run on the owner thread,
    /// inside a [`tokio::task::LocalSet`].
    pub async fn listen(&self, mut rx: mpsc::Receiver<ChildSignal>, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                signal = rx.recv() => match signal {
                    Some(signal) => self.apply(signal),
                    None => break,
                }
            }
        }
    }
}
