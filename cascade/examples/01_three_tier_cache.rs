mod common;

use std::sync::Arc;
use std::time::Duration;

use cascade::{
    ChainPolicy, Controller, MemorySource, RefreshPolicy, Response, ResponseError, SourceParams,
    SourceSelector, subscriber_fn,
};
use common::SlowNetwork;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Register the tiers. The network is refreshed at most once per minute.
    let controller = Controller::<String>::builder()
        .with_source(Arc::new(MemorySource::new()))
        .with_refresh_policy(RefreshPolicy::TimeBased {
            interval: Duration::from_secs(60),
        })
        .with_source(Arc::new(SlowNetwork::new(Duration::from_millis(200))))
        .chain_policy(ChainPolicy::SkipIfPreviousHasData)
        .source_timeout(Duration::from_secs(2))
        .build()?;

    // 2. Print everything the controller delivers.
    controller.register_callback(subscriber_fn(
        |r: &Response<String>| println!("<- {} from {}", r.payload(), r.origin_type()),
        |e: &ResponseError| println!("<- error: {e}"),
    ));

    // 3. First request: memory is empty, so the network is queried.
    let params = SourceParams::new().with_payload("ada".to_string());
    let report = controller.request().params(params.clone()).execute().await;
    println!("first run: {:?}", report.statuses());

    // 4. Second request: memory now holds the value and the network is skipped.
    let report = controller.request().params(params).execute().await;
    println!("second run: {:?}", report.statuses());

    // 5. Read the cache directly.
    let cached = controller.peek(SourceSelector::memory(), &SourceParams::default())?;
    println!("memory holds: {cached:?}");

    // 6. Force the network although memory is warm and the interval has not elapsed.
    let report = controller
        .request_for(SourceSelector::network())?
        .params(SourceParams::new().forced())
        .execute()
        .await;
    println!("forced run: {:?}", report.statuses());

    Ok(())
}
