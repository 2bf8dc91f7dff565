use cascade::compose::{Chain, Compose};
use cascade::{ErrorKind, Fetch, Response, SourceParams, SourceType};
use cascade_mock::MockSource;

use crate::fetch;
use crate::helpers::{answering, failing, s};

#[tokio::test]
async fn default_converter_passes_original_params() {
    let a = answering(SourceType::Disk, "token");
    let b = answering(SourceType::Network, "profile");
    let chain = Chain::new(fetch(&a), fetch(&b));
    let params = SourceParams::new().with_index(3).with_payload(s("query"));

    let out = chain.get(&params).await.unwrap();

    assert_eq!(out.payload(), "profile");
    assert_eq!(out.origin_type(), SourceType::Network);
    let seen = &b.params_log()[0];
    assert_eq!(seen.index(), 3);
    assert_eq!(seen.payload::<String>(), Some(&s("query")));
}

#[tokio::test]
async fn converter_derives_second_leg_params_from_first_payload() {
    let a = answering(SourceType::Disk, "token-1");
    let b = answering(SourceType::Network, "profile");
    let chain = Chain::new(fetch(&a), fetch(&b)).with_converter(
        |token: &String, original: &SourceParams| {
            SourceParams::new()
                .with_index(original.index() + 1)
                .with_payload(format!("auth:{token}"))
        },
    );

    chain.get(&SourceParams::new().with_index(1)).await.unwrap();

    let seen = &b.params_log()[0];
    assert_eq!(seen.index(), 2);
    assert_eq!(seen.payload::<String>(), Some(&s("auth:token-1")));
}

#[tokio::test]
async fn rejected_first_response_is_delivered_as_an_error() {
    let a = answering(SourceType::Disk, "expired");
    let b = answering(SourceType::Network, "profile");
    let chain = Chain::new(fetch(&a), fetch(&b))
        .with_validator(|r: &Response<String>| r.payload() != "expired");

    let err = chain.get(&SourceParams::default()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(err.failed_source(), SourceType::Disk);
    assert_eq!(b.get_calls(), 0);
}

#[tokio::test]
async fn first_leg_failure_short_circuits() {
    let a = failing(SourceType::Disk, "missing");
    let b = answering(SourceType::Network, "profile");
    let chain = Compose::new(fetch(&a)).chain(fetch(&b)).build();

    let err = chain.get(&SourceParams::default()).await.unwrap_err();

    assert_eq!(err.message(), "missing");
    assert_eq!(b.get_calls(), 0);
}

#[tokio::test]
async fn second_leg_outcome_is_the_composite_outcome() {
    let a = answering(SourceType::Disk, "token");
    let b = failing(SourceType::Network, "401");
    let chain = Compose::new(fetch(&a)).chain(fetch(&b)).build();

    let err = chain.get(&SourceParams::default()).await.unwrap_err();

    assert_eq!(err.failed_source(), SourceType::Network);
    assert_eq!(a.get_calls(), 1);
}

#[test]
fn cancel_reaches_both_legs() {
    let a = MockSource::<String>::builder(SourceType::Disk).build();
    let b = MockSource::<String>::builder(SourceType::Network).build();
    let chain = Chain::new(fetch(&a), fetch(&b));

    chain.cancel();

    assert_eq!(a.cancel_calls(), 1);
    assert_eq!(b.cancel_calls(), 1);
}
