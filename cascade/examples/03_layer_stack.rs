mod common;

use std::sync::Arc;
use std::time::Duration;

use cascade::{LayerStack, RefreshPolicy, Source, SourceBuilder, SourceParams};
use common::SlowNetwork;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let raw: Arc<dyn Source<String>> = Arc::new(SlowNetwork::new(Duration::from_millis(300)));

    // Describe the composition and persist it.
    let builder = SourceBuilder::new(Arc::clone(&raw)).with_timeout(Duration::from_millis(100));
    let stack = builder.to_stack();
    let json = serde_json::to_string_pretty(&stack)?;
    println!("{json}");

    // Rebuild it later from the stored description.
    let restored: LayerStack = serde_json::from_str(&json)?;
    let guarded = SourceBuilder::from_stack(raw, &restored)?.build_guarded(RefreshPolicy::Always);

    // The 300ms source exceeds the 100ms deadline.
    match guarded.get(&SourceParams::default()).await.into_result() {
        Some(Ok(r)) => println!("unexpected success: {}", r.payload()),
        Some(Err(e)) => println!("failed as expected: {e}"),
        None => println!("gated"),
    }

    Ok(())
}
