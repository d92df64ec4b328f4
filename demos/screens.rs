use std::time::Duration;

use tokio::task::LocalSet;
use tokio_util::sync::CancellationToken;

use lifevisor::{AggregatorConfig, ChildSignal, LogObserver, ProcessAggregator};

/// Simulates a process with two screens: screen A opens, rotates (destroy +
/// recreate inside the debounce window — no pause/stop is emitted), screen B
/// opens over it, then everything goes to the background and the debounced
/// pause/stop commit.
///
/// Run with: `cargo run --example screens --features logging`
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    LocalSet::new().run_until(run()).await
}

async fn run() -> anyhow::Result<()> {
    let aggregator = ProcessAggregator::new(AggregatorConfig::default());
    aggregator.add_observer(std::rc::Rc::new(LogObserver::new()))?;

    let (tx, rx) = tokio::sync::mpsc::channel(32);
    let token = CancellationToken::new();
    let feed = {
        let aggregator = aggregator.clone();
        let token = token.clone();
        tokio::task::spawn_local(async move { aggregator.listen(rx, token).await })
    };

    println!("--- screen A comes to the foreground");
    tx.send(ChildSignal::CreatedTimed(Duration::from_millis(35))).await?;
    tx.send(ChildSignal::Started).await?;
    tx.send(ChildSignal::Ready).await?;
    tx.send(ChildSignal::Resumed).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("--- screen A rotates (destroy + recreate, absorbed)");
    for signal in [
        ChildSignal::Paused,
        ChildSignal::Stopped,
        ChildSignal::Destroyed,
        ChildSignal::Created,
        ChildSignal::Started,
        ChildSignal::Resumed,
    ] {
        tx.send(signal).await?;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("--- screen B opens over A");
    tx.send(ChildSignal::Created).await?;
    tx.send(ChildSignal::Started).await?;
    tx.send(ChildSignal::Resumed).await?;
    tx.send(ChildSignal::Paused).await?; // A loses focus
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("--- everything goes to the background");
    tx.send(ChildSignal::Paused).await?;
    tx.send(ChildSignal::Stopped).await?;
    tx.send(ChildSignal::Stopped).await?;
    println!("--- waiting out the debounce window");
    tokio::time::sleep(Duration::from_millis(900)).await;

    println!("--- final state: {:?}", aggregator.state());
    token.cancel();
    feed.await?;
    Ok(())
}
