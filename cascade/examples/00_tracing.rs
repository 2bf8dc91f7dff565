mod common;

use std::sync::Arc;
use std::time::Duration;

use cascade::{Controller, MemorySource};
use common::SlowNetwork;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=debug with `--features tracing`.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let controller = Controller::<String>::builder()
        .with_source(Arc::new(MemorySource::new()))
        .with_source(Arc::new(SlowNetwork::new(Duration::from_millis(50))))
        .build()?;

    // Cold cache: memory is empty, the network answers and fills memory.
    let _ = controller.request().execute().await;
    // Warm cache: both tiers answer; memory skips re-storing its own value.
    let _ = controller.request().execute().await;

    Ok(())
}
