//! Error types used by the lifevisor runtime.
//!
//! There is a single error enum, [`ConfigError`]: configuration mistakes in
//! observer declarations, raised eagerly at dispatch-table build time (i.e.
//! from [`LifecycleRegistry::add_observer`](crate::LifecycleRegistry::add_observer)),
//! never at dispatch time.
//!
//! Runtime invocation failures are deliberately *not* errors: a panicking
//! observer handler is caught at the call site and logged, so one failing
//! observer never prevents the remaining observers from receiving the same
//! event.

use thiserror::Error;

use crate::model::Event;

/// # Errors produced while building an observer's dispatch table.
///
/// These represent mistakes in the observer's declared bindings. They are
/// surfaced to the registering code the first time the offending type is
/// observed, and the registration is rejected.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One handler identity was bound to two different events somewhere in
    /// the merged binding set of a type.
    #[error(
        "handler `{handler}` in `{type_name}` already bound to {previous:?}, new value {requested:?}"
    )]
    ConflictingBinding {
        /// Name of the observer type whose table was being built.
        type_name: &'static str,
        /// The conflicting handler identity.
        handler: &'static str,
        /// The event the handler was first bound to.
        previous: Event,
        /// The event the later binding tried to attach.
        requested: Event,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifevisor::{ConfigError, Event};
    ///
    /// let err = ConfigError::ConflictingBinding {
    ///     type_name: "Demo",
    ///     handler: "on_show",
    ///     previous: Event::Start,
    ///     requested: Event::Resume,
    /// };
    /// assert_eq!(err.as_label(), "conflicting_binding");
    /// ```
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ConflictingBinding { .. } => "conflicting_binding",
        }
    }

    /// Returns a human-readable message with details about the error.
    #[must_use]
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::ConflictingBinding {
                type_name,
                handler,
                previous,
                requested,
            } => {
                format!(
                    "conflicting binding in {type_name}: {handler} bound to both \
                     {previous:?} and {requested:?}"
                )
            }
        }
    }
}
