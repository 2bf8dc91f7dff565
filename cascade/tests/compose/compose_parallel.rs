use std::time::Duration;

use cascade::compose::{Compose, Parallel};
use cascade::{
    Controller, ErrorKind, Fetch, ParallelParams, Response, SourceParams, SourceType,
};
use cascade_mock::{MockBehavior, MockSource};
use tokio::time::Instant;

use crate::fetch;
use crate::helpers::{recorder, s};

fn join(a: Response<String>, b: Response<String>) -> Response<String> {
    Response::new(format!("{}+{}", a.payload(), b.payload()), b.origin_type())
}

#[tokio::test(start_paused = true)]
async fn legs_run_concurrently_and_merge() {
    let a = MockSource::builder(SourceType::Disk)
        .returns(s("a"))
        .delay(Duration::from_millis(30))
        .build();
    let b = MockSource::builder(SourceType::Network)
        .returns(s("b"))
        .delay(Duration::from_millis(30))
        .build();
    let parallel = Parallel::new(fetch(&a), fetch(&b), join);

    let start = Instant::now();
    let out = parallel.get(&SourceParams::default()).await.unwrap();

    assert_eq!(out.payload(), "a+b");
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(30));
    assert!(elapsed < Duration::from_millis(60), "legs must overlap: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn first_failure_wins_and_cancels_the_other_leg() {
    let a = MockSource::builder(SourceType::Disk)
        .returns(s("a"))
        .delay(Duration::from_millis(10))
        .build();
    let b = MockSource::builder(SourceType::Network)
        .fails("b down")
        .delay(Duration::from_millis(5))
        .build();
    let parallel = Parallel::new(fetch(&a), fetch(&b), join);

    let start = Instant::now();
    let err = parallel.get(&SourceParams::default()).await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.message(), "b down");
    assert!(elapsed >= Duration::from_millis(5));
    assert!(elapsed < Duration::from_millis(10), "failed after {elapsed:?}");
    assert_eq!(a.cancel_calls(), 1);
    assert_eq!(b.cancel_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn late_success_after_a_failure_is_never_delivered() {
    let a = MockSource::builder(SourceType::Disk)
        .returns(s("a"))
        .delay(Duration::from_millis(10))
        .build();
    let b = MockSource::builder(SourceType::Network)
        .fails("b down")
        .delay(Duration::from_millis(5))
        .build();
    let source = Compose::new(fetch(&a))
        .parallel(fetch(&b), join)
        .into_source(SourceType::Network);
    let ctrl = Controller::builder().with_source(source).build().unwrap();
    let rec = recorder();
    ctrl.register_callback(rec.as_subscriber());

    ctrl.request().execute().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(rec.len(), 1);
    assert_eq!(rec.failures()[0].0, ErrorKind::Failed);
    assert!(rec.successes().is_empty());
}

#[tokio::test]
async fn parallel_params_split_between_legs() {
    let a = MockSource::returning(SourceType::Disk, s("a"));
    let b = MockSource::returning(SourceType::Network, s("b"));
    let parallel = Parallel::new(fetch(&a), fetch(&b), join);
    let params = SourceParams::new().with_payload(ParallelParams::new(
        SourceParams::new().with_index(1),
        SourceParams::new().with_index(2),
    ));

    parallel.get(&params).await.unwrap();

    assert_eq!(a.params_log()[0].index(), 1);
    assert_eq!(b.params_log()[0].index(), 2);
}

#[tokio::test]
async fn without_split_both_legs_share_the_params() {
    let a = MockSource::returning(SourceType::Disk, s("a"));
    let b = MockSource::returning(SourceType::Network, s("b"));
    let parallel = Parallel::new(fetch(&a), fetch(&b), join);

    parallel
        .get(&SourceParams::new().with_index(9))
        .await
        .unwrap();

    assert_eq!(a.params_log()[0].index(), 9);
    assert_eq!(b.params_log()[0].index(), 9);
}

#[tokio::test]
async fn cancelling_the_composite_cancels_hanging_legs() {
    let a = MockSource::<String>::builder(SourceType::Disk)
        .behavior(MockBehavior::Hang)
        .build();
    let b = MockSource::<String>::builder(SourceType::Network)
        .behavior(MockBehavior::Hang)
        .build();
    let parallel = Parallel::new(fetch(&a), fetch(&b), join);

    let params = SourceParams::default();
    let (result, ()) = tokio::join!(parallel.get(&params), async {
        tokio::task::yield_now().await;
        parallel.cancel();
    });

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
    assert!(a.cancel_calls() >= 1);
    assert!(b.cancel_calls() >= 1);
}
