use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cascade::{ErrorKind, LegStatus, ResponseError, SourceType};
use cascade_mock::MockSource;

use crate::helpers::{
    Event, MockBehavior, builder_with, controller, dyn_source, empty, failing, memory, recorder,
};

#[tokio::test]
async fn filtered_error_reaches_request_and_controller_subscribers() {
    let net = failing(SourceType::Network, "socket closed");
    let ctrl = controller(&[dyn_source(&net)]);
    let global = recorder();
    let local = recorder();
    ctrl.register_callback(global.as_subscriber());

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    ctrl.request()
        .subscribe(local.as_subscriber())
        .error_filter(move |e: ResponseError| {
            seen.fetch_add(1, Ordering::SeqCst);
            e.with_user_message("Please check your connection").with_status(503)
        })
        .execute()
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1, "filter runs once per failure");
    let expected = vec![(
        ErrorKind::Failed,
        SourceType::Network,
        "Please check your connection".to_string(),
    )];
    assert_eq!(local.failures(), expected);
    assert_eq!(global.failures(), expected);
}

#[tokio::test]
async fn unfiltered_errors_keep_their_message() {
    let net = failing(SourceType::Network, "socket closed");
    let ctrl = controller(&[dyn_source(&net)]);
    let rec = recorder();

    ctrl.request().subscribe(rec.as_subscriber()).execute().await;

    assert_eq!(
        rec.failures(),
        vec![(ErrorKind::Failed, SourceType::Network, "socket closed".to_string())]
    );
}

#[tokio::test]
async fn empty_answers_bypass_the_filter() {
    let mem = memory();
    let disk = empty(SourceType::Disk);
    let ctrl = controller(&[dyn_source(&mem), dyn_source(&disk)]);
    let rec = recorder();

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let report = ctrl
        .request()
        .subscribe(rec.as_subscriber())
        .error_filter(move |e: ResponseError| {
            seen.fetch_add(1, Ordering::SeqCst);
            e
        })
        .execute()
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.statuses(), vec![LegStatus::Empty, LegStatus::Empty]);
    let mut events = rec.events();
    events.sort_by_key(|e| format!("{e:?}"));
    assert_eq!(
        events,
        vec![Event::Empty(SourceType::Disk), Event::Empty(SourceType::Memory)]
    );
}

#[tokio::test(start_paused = true)]
async fn source_timeout_fails_the_leg_and_cancels_the_source() {
    let net = MockSource::builder(SourceType::Network)
        .behavior(MockBehavior::Hang)
        .build();
    let ctrl = builder_with(&[dyn_source(&net)])
        .source_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let rec = recorder();

    let report = ctrl.request().subscribe(rec.as_subscriber()).execute().await;

    assert_eq!(report.status_of(SourceType::Network), Some(LegStatus::Failed));
    assert_eq!(net.cancel_calls(), 1);
    let failures = rec.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, ErrorKind::TimedOut);
    assert_eq!(failures[0].1, SourceType::Network);
    assert!(!ctrl.sources()[0].is_busy());
}

#[tokio::test]
async fn one_failing_tier_does_not_hide_another_tiers_success() {
    let disk = failing(SourceType::Disk, "corrupt file");
    let net = crate::helpers::answering(SourceType::Network, "net");
    let ctrl = controller(&[dyn_source(&disk), dyn_source(&net)]);
    let rec = recorder();

    let report = ctrl.request().subscribe(rec.as_subscriber()).execute().await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(rec.successes(), vec!["net".to_string()]);
    assert_eq!(rec.failures().len(), 1);
    // the failing tier still receives the other tier's response
    assert_eq!(disk.stored(), Some("net".to_string()));
}
