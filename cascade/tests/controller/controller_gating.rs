use std::time::Duration;

use cascade::{ErrorKind, LegStatus, RefreshPolicy, SourceParams, SourceType};
use cascade_mock::MockSource;
use tokio_test::{assert_pending, assert_ready, task};

use crate::helpers::{MockBehavior, answering, builder_with, dyn_source, recorder};

#[tokio::test]
async fn one_shot_sources_report_refresh_skipped_until_forced() {
    let net = answering(SourceType::Network, "x");
    let ctrl = builder_with(&[])
        .with_source_policy(dyn_source(&net), RefreshPolicy::OneShot)
        .build()
        .unwrap();

    let first = ctrl.request().execute().await;
    let second = ctrl.request().execute().await;
    let forced = ctrl
        .request()
        .params(SourceParams::new().forced())
        .execute()
        .await;

    assert_eq!(first.status_at(0), Some(LegStatus::Succeeded));
    assert_eq!(second.status_at(0), Some(LegStatus::RefreshSkipped));
    assert_eq!(forced.status_at(0), Some(LegStatus::Succeeded));
    assert_eq!(net.get_calls(), 2);
}

#[tokio::test]
async fn force_refresh_rearms_every_source() {
    let net = answering(SourceType::Network, "x");
    let ctrl = builder_with(&[])
        .with_refresh_policy(RefreshPolicy::OneShot)
        .with_source(dyn_source(&net))
        .build()
        .unwrap();

    ctrl.request().execute().await;
    ctrl.force_refresh();
    let report = ctrl.request().execute().await;

    assert_eq!(report.status_at(0), Some(LegStatus::Succeeded));
    assert_eq!(net.get_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn time_based_sources_refetch_after_the_interval() {
    let net = answering(SourceType::Network, "x");
    let ctrl = builder_with(&[])
        .with_refresh_policy(RefreshPolicy::TimeBased {
            interval: Duration::from_secs(60),
        })
        .with_source(dyn_source(&net))
        .build()
        .unwrap();

    ctrl.request().execute().await;
    let early = ctrl.request().execute().await;
    tokio::time::advance(Duration::from_secs(60)).await;
    let late = ctrl.request().execute().await;

    assert_eq!(early.status_at(0), Some(LegStatus::RefreshSkipped));
    assert_eq!(late.status_at(0), Some(LegStatus::Succeeded));
    assert_eq!(net.get_calls(), 2);
}

#[tokio::test]
async fn overlapping_requests_see_a_busy_source() {
    let net = MockSource::builder(SourceType::Network)
        .behavior(MockBehavior::Hang)
        .build();
    let ctrl = builder_with(&[dyn_source(&net)]).build().unwrap();
    let rec = recorder();
    ctrl.register_callback(rec.as_subscriber());

    let mut first = task::spawn(ctrl.request().execute());
    assert_pending!(first.poll());
    assert!(ctrl.sources()[0].is_busy());

    let second = ctrl.request().execute().await;
    assert_eq!(second.status_at(0), Some(LegStatus::Busy));
    assert!(rec.is_empty(), "a gated call produces no delivery");

    ctrl.cancel();
    let report = assert_ready!(first.poll());

    assert_eq!(report.status_at(0), Some(LegStatus::Failed));
    assert_eq!(net.get_calls(), 1);
    assert_eq!(net.cancel_calls(), 1);
    assert_eq!(rec.failures()[0].0, ErrorKind::Cancelled);
    assert!(!ctrl.sources()[0].is_busy());
}

#[tokio::test]
async fn cancel_for_targets_a_single_source() {
    let disk = MockSource::builder(SourceType::Disk)
        .behavior(MockBehavior::Hang)
        .build();
    let net = MockSource::builder(SourceType::Network)
        .behavior(MockBehavior::Hang)
        .build();
    let ctrl = builder_with(&[dyn_source(&disk), dyn_source(&net)])
        .build()
        .unwrap();

    let mut pending = task::spawn(ctrl.request().execute());
    assert_pending!(pending.poll());

    ctrl.cancel_for(cascade::SourceSelector::disk()).unwrap();
    assert_pending!(pending.poll());
    assert_eq!(disk.cancel_calls(), 1);
    assert_eq!(net.cancel_calls(), 0);

    ctrl.cancel_for(cascade::SourceSelector::network()).unwrap();
    let report = assert_ready!(pending.poll());
    assert_eq!(report.failed(), 2);
}
