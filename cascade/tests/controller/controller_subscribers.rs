use std::sync::{Arc, Mutex};

use cascade::{ResponseError, SourceType, Subscriber, subscriber_fn};

use crate::helpers::{answering, builder_with, controller, dyn_source, recorder, s};

fn labelled(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> Arc<dyn Subscriber<String>> {
    let ok = Arc::clone(log);
    let err = Arc::clone(log);
    subscriber_fn(
        move |_r: &cascade::Response<String>| ok.lock().unwrap().push(label),
        move |_e: &ResponseError| err.lock().unwrap().push(label),
    )
}

#[tokio::test]
async fn request_subscribers_hear_before_controller_subscribers() {
    let net = answering(SourceType::Network, "x");
    let ctrl = controller(&[dyn_source(&net)]);
    let log = Arc::new(Mutex::new(Vec::new()));
    ctrl.register_callback(labelled(&log, "controller-1"));
    ctrl.register_callback(labelled(&log, "controller-2"));

    ctrl.request()
        .subscribe(labelled(&log, "request-1"))
        .subscribe(labelled(&log, "request-2"))
        .execute()
        .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["request-1", "request-2", "controller-1", "controller-2"]
    );
}

#[tokio::test]
async fn request_subscribers_are_scoped_to_their_request() {
    let net = answering(SourceType::Network, "x");
    let ctrl = controller(&[dyn_source(&net)]);
    let scoped = recorder();

    ctrl.request().subscribe(scoped.as_subscriber()).execute().await;
    ctrl.request().execute().await;

    assert_eq!(scoped.successes(), vec![s("x")]);
    assert!(!ctrl.has_callbacks());
}

#[tokio::test]
async fn controller_callbacks_can_be_removed() {
    let net = answering(SourceType::Network, "x");
    let ctrl = controller(&[dyn_source(&net)]);
    let rec = recorder();
    let sub = rec.as_subscriber();

    assert!(ctrl.register_callback(Arc::clone(&sub)));
    assert!(!ctrl.register_callback(Arc::clone(&sub)), "registration is idempotent");
    ctrl.request().execute().await;
    assert!(ctrl.deregister_callback(&sub));
    assert!(!ctrl.deregister_callback(&sub));
    ctrl.request().execute().await;

    assert_eq!(rec.successes(), vec![s("x")]);
}

#[tokio::test]
async fn clear_callbacks_silences_the_controller() {
    let net = answering(SourceType::Network, "x");
    let rec = recorder();
    let ctrl = builder_with(&[dyn_source(&net)])
        .with_callback(rec.as_subscriber())
        .build()
        .unwrap();
    assert!(ctrl.has_callbacks());

    ctrl.clear_callbacks();
    ctrl.request().execute().await;

    assert!(rec.is_empty());
    assert!(!ctrl.has_callbacks());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispatch_subscriber_delivers_on_the_target_runtime() {
    use cascade::DispatchSubscriber;
    use tokio::sync::mpsc;

    let net = answering(SourceType::Network, "x");
    let ctrl = controller(&[dyn_source(&net)]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let forward = subscriber_fn(
        move |r: &cascade::Response<String>| {
            let _ = tx.send(r.payload().clone());
        },
        |_e: &ResponseError| {},
    );
    ctrl.register_callback(DispatchSubscriber::on_current(forward));

    ctrl.request().execute().await;

    assert_eq!(rx.recv().await, Some(s("x")));
}
