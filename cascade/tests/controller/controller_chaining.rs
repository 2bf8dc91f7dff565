use std::sync::{Arc, Mutex};
use std::time::Duration;

use cascade::{
    ChainPolicy, GuardedSource, LegStatus, RegistryKind, SkipIfPreviousHasData, Source,
    SourceParams, SourceType,
};
use cascade_mock::MockSource;

use crate::helpers::{
    answering, builder_with, cached, controller, dyn_source, empty, memory, recorder, s,
};

#[tokio::test]
async fn warm_memory_short_circuits_the_network() {
    let mem = cached("cached");
    let net = answering(SourceType::Network, "fresh");
    let ctrl = builder_with(&[dyn_source(&mem), dyn_source(&net)])
        .chain_policy(ChainPolicy::SkipIfPreviousHasData)
        .build()
        .unwrap();
    let rec = recorder();
    ctrl.register_callback(rec.as_subscriber());

    let report = ctrl.request().execute().await;

    assert_eq!(net.get_calls(), 0);
    assert_eq!(report.status_of(SourceType::Network), Some(LegStatus::ChainSkipped));
    assert_eq!(rec.successes(), vec![s("cached")]);
    assert_eq!(rec.len(), 1);
}

#[tokio::test]
async fn cold_memory_lets_the_network_through() {
    let mem = memory();
    let net = answering(SourceType::Network, "fresh");
    let ctrl = builder_with(&[dyn_source(&mem), dyn_source(&net)])
        .chain_policy(ChainPolicy::SkipIfPreviousHasData)
        .build()
        .unwrap();

    let report = ctrl.request().execute().await;

    assert_eq!(net.get_calls(), 1);
    assert_eq!(report.statuses(), vec![LegStatus::Empty, LegStatus::Succeeded]);
}

#[tokio::test]
async fn always_continue_queries_every_tier() {
    let mem = cached("cached");
    let disk = answering(SourceType::Disk, "disk");
    let net = answering(SourceType::Network, "net");
    let ctrl = controller(&[dyn_source(&mem), dyn_source(&disk), dyn_source(&net)]);

    let report = ctrl.request().execute().await;

    assert_eq!(report.invoked(), 3);
    assert_eq!(disk.get_calls(), 1);
    assert_eq!(net.get_calls(), 1);
}

#[tokio::test]
async fn predicate_only_sees_the_immediate_predecessor() {
    let mem = cached("cached");
    let disk = empty(SourceType::Disk);
    let net = answering(SourceType::Network, "net");
    let asked: Arc<Mutex<Vec<(SourceType, SourceType)>>> = Arc::default();
    let seen = Arc::clone(&asked);
    let ctrl = builder_with(&[dyn_source(&mem), dyn_source(&disk), dyn_source(&net)])
        .chainer(move |prev: &GuardedSource<String>, next: &GuardedSource<String>| {
            seen.lock().unwrap().push((prev.source_type(), next.source_type()));
            prev.source_type() != SourceType::Memory
        })
        .build()
        .unwrap();

    let report = ctrl.request().execute().await;

    // disk is skipped after memory; network is still judged against disk.
    assert_eq!(
        *asked.lock().unwrap(),
        vec![
            (SourceType::Memory, SourceType::Disk),
            (SourceType::Disk, SourceType::Network),
        ]
    );
    assert_eq!(
        report.statuses(),
        vec![LegStatus::Succeeded, LegStatus::ChainSkipped, LegStatus::Succeeded]
    );
    assert_eq!(disk.get_calls(), 0);
    assert_eq!(net.get_calls(), 1);
}

#[tokio::test]
async fn inline_answers_are_cascaded_before_the_next_pair_is_judged() {
    let net = answering(SourceType::Network, "x");
    let mem = memory();
    let disk = empty(SourceType::Disk);
    let ctrl = builder_with(&[dyn_source(&net), dyn_source(&mem), dyn_source(&disk)])
        .registry(RegistryKind::Positional)
        .chain_policy(ChainPolicy::SkipIfPreviousHasData)
        .build()
        .unwrap();

    let report = ctrl.request().execute().await;

    // network answers on its first poll and fills memory, memory then answers
    // from the cascaded value, and disk is judged against a warm memory.
    assert_eq!(
        report.statuses(),
        vec![LegStatus::Succeeded, LegStatus::Succeeded, LegStatus::ChainSkipped]
    );
    assert_eq!(disk.get_calls(), 0);
    assert_eq!(mem.peek(&SourceParams::default()), Some(s("x")));
}

#[tokio::test(start_paused = true)]
async fn pending_predecessor_has_not_cascaded_when_judged() {
    let net = MockSource::builder(SourceType::Network)
        .returns(s("late"))
        .delay(Duration::from_millis(20))
        .build();
    let mem = memory();
    let disk = empty(SourceType::Disk);
    let ctrl = builder_with(&[dyn_source(&net), dyn_source(&mem), dyn_source(&disk)])
        .registry(RegistryKind::Positional)
        .chain_policy(ChainPolicy::SkipIfPreviousHasData)
        .build()
        .unwrap();

    let report = ctrl.request().execute().await;

    assert_eq!(
        report.statuses(),
        vec![LegStatus::Succeeded, LegStatus::Empty, LegStatus::Empty]
    );
    assert_eq!(disk.get_calls(), 1);
    assert_eq!(mem.peek(&SourceParams::default()), Some(s("late")));
}

#[tokio::test]
async fn request_chainer_overrides_the_controller_default() {
    let mem = memory();
    let net = answering(SourceType::Network, "net");
    let ctrl = controller(&[dyn_source(&mem), dyn_source(&net)]);

    let report = ctrl
        .request()
        .chainer(|_: &GuardedSource<String>, next: &GuardedSource<String>| {
            next.source_type() != SourceType::Network
        })
        .execute()
        .await;

    assert_eq!(net.get_calls(), 0);
    assert_eq!(report.status_at(1), Some(LegStatus::ChainSkipped));
}

#[tokio::test]
async fn first_source_is_always_queried() {
    let net = answering(SourceType::Network, "net");
    let ctrl = builder_with(&[dyn_source(&net)])
        .chainer(|_: &GuardedSource<String>, _: &GuardedSource<String>| false)
        .build()
        .unwrap();

    let report = ctrl.request().execute().await;

    assert_eq!(report.statuses(), vec![LegStatus::Succeeded]);
}

#[tokio::test]
async fn explicit_targets_are_appended_after_registered_sources() {
    let mem = cached("cached");
    let ctrl = controller(&[dyn_source(&mem)]);
    let extra = answering(SourceType::Network, "extra");
    let extra_guard = Arc::new(GuardedSource::new(dyn_source(&extra)));

    let report = ctrl
        .request()
        .target(extra_guard)
        .chainer(SkipIfPreviousHasData)
        .execute()
        .await;

    assert_eq!(report.legs().len(), 2);
    assert_eq!(report.status_at(1), Some(LegStatus::ChainSkipped));
    assert_eq!(extra.get_calls(), 0);
}
