mod common;

use std::sync::Arc;
use std::time::Duration;

use cascade::compose::Compose;
use cascade::{
    Controller, Fetch, MemorySource, ParallelParams, Response, SourceParams, SourceType,
};
use common::SlowNetwork;

fn greeting(a: Response<String>, b: Response<String>) -> Response<String> {
    Response::new(format!("{} / {}", a.payload(), b.payload()), b.origin_type())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fast: Arc<dyn Fetch<String>> = Arc::new(SlowNetwork::new(Duration::from_millis(50)));
    let slow: Arc<dyn Fetch<String>> = Arc::new(SlowNetwork::new(Duration::from_millis(150)));

    // Chain: the second call is addressed using the first answer.
    let chained = Compose::new(Arc::clone(&fast))
        .chain(Arc::clone(&slow))
        .validator(|r: &Response<String>| !r.payload().is_empty())
        .converter(|first: &String, _: &SourceParams| {
            SourceParams::new().with_payload(first.to_uppercase())
        })
        .build();
    println!("chain:    {}", chained.get(&SourceParams::default()).await?.payload());

    // Parallel: both calls at once, each with its own params.
    let both = Compose::new(Arc::clone(&fast))
        .parallel(Arc::clone(&slow), greeting)
        .build();
    let split = ParallelParams::new(
        SourceParams::new().with_payload("left".to_string()),
        SourceParams::new().with_payload("right".to_string()),
    );
    let started = std::time::Instant::now();
    let out = both.get(&SourceParams::new().with_payload(split)).await?;
    println!("parallel: {} in {:?}", out.payload(), started.elapsed());

    // Any pipeline can back a controller tier.
    let controller = Controller::<String>::builder()
        .with_source(Arc::new(MemorySource::new()))
        .with_source(
            Compose::new(fast)
                .merge(slow, greeting)
                .into_source(SourceType::Network),
        )
        .build()?;
    let report = controller.request().execute().await;
    println!("controller: {:?}", report.statuses());
    println!(
        "memory now holds: {:?}",
        controller.sources()[0].peek(&SourceParams::default())
    );

    Ok(())
}
