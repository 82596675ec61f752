//! Deep-link resolver tests: the approval action must fire exactly once no matter the
//! order in which its asynchronous inputs arrive.

use onl_engine::{
    deeplink::{DeepLinkAction, DeepLinkResolver, Resolution, ResolverState},
    order_types::OrderId,
    traits::{MerchantId, MerchantResolver, ResolveError},
};
use support::StaticResolver;

mod support;

fn awaiting() -> Vec<OrderId> {
    vec![OrderId("ord-7".into()), OrderId("ord-9".into())]
}

#[derive(Clone, Copy, Debug)]
enum Input {
    Action,
    Auth,
    Orders,
}

fn apply(resolver: &mut DeepLinkResolver, input: Input) -> Resolution {
    match input {
        Input::Action => resolver.action_from_url(DeepLinkAction::ApproveOrder),
        Input::Auth => resolver.auth_resolved(Some("cust-1".into())),
        Input::Orders => resolver.awaiting_orders_changed(awaiting()),
    }
}

#[test]
fn fires_exactly_once_for_every_arrival_order() {
    support::init_test_env();
    use Input::*;
    let permutations = [
        [Action, Auth, Orders],
        [Action, Orders, Auth],
        [Auth, Action, Orders],
        [Auth, Orders, Action],
        [Orders, Action, Auth],
        [Orders, Auth, Action],
    ];
    for permutation in permutations {
        let mut resolver = DeepLinkResolver::new();
        resolver.merchant_resolved(MerchantId("corner-store".into()));
        let mut fired = 0;
        for input in permutation {
            if let Resolution::FireApproval(ids) = apply(&mut resolver, input) {
                assert_eq!(ids, awaiting(), "wrong order set for {permutation:?}");
                fired += 1;
            }
        }
        assert_eq!(fired, 1, "expected exactly one fire for {permutation:?}");
        assert_eq!(resolver.state(), ResolverState::Fired);
    }
}

#[test]
fn merchant_resolution_is_a_gating_input_too() {
    support::init_test_env();
    let mut resolver = DeepLinkResolver::new();
    resolver.action_from_url(DeepLinkAction::ApproveOrder);
    resolver.auth_resolved(Some("cust-1".into()));
    assert_eq!(resolver.awaiting_orders_changed(awaiting()), Resolution::Pending);
    // Resolution of the merchant id is the last input to land.
    assert_eq!(resolver.merchant_resolved(MerchantId("corner-store".into())), Resolution::FireApproval(awaiting()));
}

#[test]
fn a_refresh_with_the_action_still_in_the_url_does_not_refire() {
    support::init_test_env();
    let mut resolver = DeepLinkResolver::new();
    resolver.merchant_resolved(MerchantId("corner-store".into()));
    resolver.auth_resolved(Some("cust-1".into()));
    resolver.awaiting_orders_changed(awaiting());
    assert_eq!(resolver.action_from_url(DeepLinkAction::ApproveOrder), Resolution::FireApproval(awaiting()));

    // The customer reloads before the URL was scrubbed.
    assert_eq!(resolver.action_from_url(DeepLinkAction::ApproveOrder), Resolution::Done);
    assert_eq!(resolver.awaiting_orders_changed(awaiting()), Resolution::Done);
    assert_eq!(resolver.state(), ResolverState::Fired);
}

#[test]
fn an_empty_awaiting_set_keeps_the_action_latched() {
    support::init_test_env();
    let mut resolver = DeepLinkResolver::new();
    resolver.merchant_resolved(MerchantId("corner-store".into()));
    resolver.action_from_url(DeepLinkAction::ApproveOrder);
    resolver.auth_resolved(Some("cust-1".into()));
    // The order data has not synced yet.
    assert_eq!(resolver.awaiting_orders_changed(vec![]), Resolution::Pending);
    assert_eq!(resolver.state(), ResolverState::Latched);
    // The sync lands a moment later.
    assert_eq!(resolver.awaiting_orders_changed(awaiting()), Resolution::FireApproval(awaiting()));
}

#[test]
fn reset_clears_a_latched_action() {
    support::init_test_env();
    let mut resolver = DeepLinkResolver::new();
    resolver.action_from_url(DeepLinkAction::ApproveOrder);
    resolver.reset();
    assert_eq!(resolver.state(), ResolverState::Idle);
    // Inputs arriving after the reset no longer trigger anything.
    resolver.merchant_resolved(MerchantId("corner-store".into()));
    resolver.auth_resolved(Some("cust-1".into()));
    assert_eq!(resolver.awaiting_orders_changed(awaiting()), Resolution::Pending);
}

#[tokio::test]
async fn unknown_merchant_slugs_do_not_resolve() {
    support::init_test_env();
    let resolver = StaticResolver::with("corner-store", "m-001");
    let merchant = resolver.resolve("corner-store").await.unwrap();
    assert_eq!(merchant, MerchantId("m-001".into()));
    let err = resolver.resolve("no-such-store").await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound(slug) if slug == "no-such-store"));
}
