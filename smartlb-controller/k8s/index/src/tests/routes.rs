use super::*;
use crate::{admit_route, AdmissionError, Capability, PluginError, ResourceKind, RouterPlugin};
use kubert::index::IndexNamespacedResource;
use smartlb_controller_core::{EventKind, Route};
use std::collections::BTreeSet;

#[test]
fn routes_keyed_by_host() {
    let test = TestConfig::default();
    let a = mk_route("ns-0", "a", "a.example.com");
    let b = mk_route("ns-0", "b", "b.example.com");

    test.plugin
        .handle_route(EventKind::Added, &a)
        .expect("route must be handled");
    test.plugin
        .handle_route(EventKind::Added, &b)
        .expect("route must be handled");
    test.plugin
        .handle_route(EventKind::Deleted, &a)
        .expect("route must be handled");

    let routes = test.store.snapshot().routes;
    assert_eq!(routes.len(), 1);
    assert_eq!(
        routes.get("b.example.com"),
        Some(&Route {
            url: "b.example.com".to_string(),
            weight: 1,
        })
    );
}

#[test]
fn redelivered_route_is_idempotent() {
    let test = TestConfig::default();
    let route = mk_route("ns-0", "a", "a.example.com");

    test.plugin
        .handle_route(EventKind::Added, &route)
        .expect("route must be handled");
    let once = test.store.snapshot();
    test.plugin
        .handle_route(EventKind::Added, &route)
        .expect("route must be handled");

    assert_eq!(once, test.store.snapshot());
}

#[test]
fn route_without_host_is_skipped() {
    let test = TestConfig::default();
    test.plugin
        .handle_route(EventKind::Added, &mk_route("ns-0", "a", ""))
        .expect("route without host must not fail");
    assert_eq!(test.store.route_count(), 0);
}

#[test]
fn unsupported_and_ignored_kinds() {
    let test = TestConfig::default();

    assert_eq!(
        test.plugin.handle_namespaces(&BTreeSet::new()),
        Err(PluginError::Unsupported(ResourceKind::Namespace))
    );
    assert_eq!(
        test.plugin
            .handle_node(EventKind::Added, &k8s::Node::default()),
        Err(PluginError::Unsupported(ResourceKind::Node))
    );
    assert_eq!(
        test.plugin
            .handle_endpoints(EventKind::Modified, &k8s::Endpoints::default()),
        Ok(())
    );
    assert_eq!(test.plugin.commit(), Ok(()));
    assert!(test.store.snapshot().is_empty());

    assert_eq!(
        test.plugin.capability(ResourceKind::Route),
        Capability::Tracked
    );
    assert_eq!(test.plugin.capability(ResourceKind::Pod), Capability::Tracked);
    assert_eq!(
        test.plugin.capability(ResourceKind::Endpoints),
        Capability::Ignored
    );
    assert_eq!(
        test.plugin.capability(ResourceKind::Namespace),
        Capability::Unsupported
    );
    assert_eq!(
        test.plugin.capability(ResourceKind::Node),
        Capability::Unsupported
    );
    assert_eq!(
        PluginError::Unsupported(ResourceKind::Node).to_string(),
        "node handling is not implemented for this plugin"
    );
}

#[test]
fn index_applies_and_deletes_routes() {
    let test = TestConfig::default();

    test.index
        .write()
        .apply(mk_route("ns-0", "a", "a.example.com"));
    test.index
        .write()
        .apply(mk_route("ns-1", "b", "b.example.com"));
    assert_eq!(test.store.route_count(), 2);

    <crate::Index<_> as IndexNamespacedResource<k8s::Route>>::delete(
        &mut test.index.write(),
        "ns-0".to_string(),
        "a".to_string(),
    );
    let routes = test.store.snapshot().routes;
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["b.example.com"]);

    // Deleting an unknown route has no effect.
    <crate::Index<_> as IndexNamespacedResource<k8s::Route>>::delete(
        &mut test.index.write(),
        "ns-0".to_string(),
        "a".to_string(),
    );
    assert_eq!(test.store.route_count(), 1);
}

#[test]
fn index_replaces_edited_host() {
    let test = TestConfig::default();

    test.index
        .write()
        .apply(mk_route("ns-0", "a", "a.example.com"));
    test.index
        .write()
        .apply(mk_route("ns-0", "a", "a2.example.com"));

    let routes = test.store.snapshot().routes;
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["a2.example.com"]);
    assert_eq!(test.index.read().routes_len(), 1);
}

#[test]
fn index_rejects_wildcard_routes() {
    let test = TestConfig::default();

    test.index
        .write()
        .apply(mk_wildcard_route("ns-0", "a", "a.example.com"));
    assert_eq!(test.store.route_count(), 0);
    assert_eq!(test.index.read().routes_len(), 0);

    // A previously admitted route that becomes a wildcard route is withdrawn.
    test.index
        .write()
        .apply(mk_route("ns-0", "b", "b.example.com"));
    assert_eq!(test.store.route_count(), 1);
    test.index
        .write()
        .apply(mk_wildcard_route("ns-0", "b", "b.example.com"));
    assert_eq!(test.store.route_count(), 0);
}

#[test]
fn shared_host_outlives_deleted_claimant() {
    let test = TestConfig::default();

    test.index
        .write()
        .apply(mk_route("ns-0", "a", "shop.example.com"));
    test.index
        .write()
        .apply(mk_route("ns-1", "b", "shop.example.com"));
    assert_eq!(test.store.route_count(), 1);

    <crate::Index<_> as IndexNamespacedResource<k8s::Route>>::delete(
        &mut test.index.write(),
        "ns-0".to_string(),
        "a".to_string(),
    );
    let routes = test.store.snapshot().routes;
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["shop.example.com"]);

    <crate::Index<_> as IndexNamespacedResource<k8s::Route>>::delete(
        &mut test.index.write(),
        "ns-1".to_string(),
        "b".to_string(),
    );
    assert_eq!(test.store.route_count(), 0);
}

#[test]
fn shared_host_outlives_edited_claimant() {
    let test = TestConfig::default();

    test.index
        .write()
        .apply(mk_route("ns-0", "a", "shop.example.com"));
    test.index
        .write()
        .apply(mk_route("ns-1", "b", "shop.example.com"));
    test.index
        .write()
        .apply(mk_route("ns-0", "a", "cart.example.com"));

    let routes = test.store.snapshot().routes;
    assert_eq!(
        routes.keys().collect::<Vec<_>>(),
        vec!["cart.example.com", "shop.example.com"]
    );

    // Moving the last claimant away withdraws the host.
    test.index
        .write()
        .apply(mk_route("ns-1", "b", "cart.example.com"));
    let routes = test.store.snapshot().routes;
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["cart.example.com"]);
}

#[test]
fn shared_host_outlives_rejected_claimant() {
    let test = TestConfig::default();

    test.index
        .write()
        .apply(mk_route("ns-0", "a", "shop.example.com"));
    test.index
        .write()
        .apply(mk_route("ns-1", "b", "shop.example.com"));
    test.index
        .write()
        .apply(mk_wildcard_route("ns-0", "a", "shop.example.com"));

    assert_eq!(test.index.read().routes_len(), 1);
    let routes = test.store.snapshot().routes;
    assert_eq!(routes.keys().collect::<Vec<_>>(), vec!["shop.example.com"]);

    test.index
        .write()
        .apply(mk_wildcard_route("ns-1", "b", "shop.example.com"));
    assert_eq!(test.store.route_count(), 0);
}

#[test]
fn admission() {
    let mut route = mk_route("ns-0", "a", "a.example.com");
    assert_eq!(admit_route(&route), Ok(()));

    route.spec.wildcard_policy = Some(WildcardPolicy::None);
    assert_eq!(admit_route(&route), Ok(()));

    route.spec.wildcard_policy = Some(WildcardPolicy::Subdomain);
    assert_eq!(admit_route(&route), Err(AdmissionError::Wildcard));

    route.spec.wildcard_policy = Some(WildcardPolicy::Unknown);
    assert_eq!(
        admit_route(&route),
        Err(AdmissionError::UnknownWildcardPolicy)
    );
}
