use crate::{ClusterSnapshot, EventKind, Route, RouterHost};
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};

/// Routes keyed by hostname.
pub type RouteTable = BTreeMap<String, Route>;

/// Router hosts keyed by pod name.
pub type HostTable = BTreeMap<String, RouterHost>;

/// Holds the route and router host tables.
///
/// Every operation takes the same lock for the duration of a single map operation, so a
/// [`Store::snapshot`] always observes a state that existed at one instant. Clones share the same
/// tables.
#[derive(Clone, Debug, Default)]
pub struct Store(Arc<Mutex<ClusterSnapshot>>);

/// Applies a single route event to `routes`.
///
/// The latest added or modified event for a hostname replaces any prior entry; a deleted event
/// removes the hostname entirely.
pub fn apply_route_event(routes: &mut RouteTable, kind: EventKind, route: Route) {
    match kind {
        EventKind::Added | EventKind::Modified => {
            routes.insert(route.url.clone(), route);
        }
        EventKind::Deleted => {
            routes.remove(&route.url);
        }
    }
}

/// Applies a single router host event to `hosts`.
pub fn apply_host_event(hosts: &mut HostTable, kind: EventKind, host: RouterHost) {
    match kind {
        EventKind::Added | EventKind::Modified => {
            hosts.insert(host.name.clone(), host);
        }
        EventKind::Deleted => {
            hosts.remove(&host.name);
        }
    }
}

// === impl Store ===

impl Store {
    pub fn route_event(&self, kind: EventKind, route: Route) {
        apply_route_event(&mut self.0.lock().routes, kind, route);
    }

    pub fn host_event(&self, kind: EventKind, host: RouterHost) {
        apply_host_event(&mut self.0.lock().router_hosts, kind, host);
    }

    pub fn apply_route(&self, route: Route) {
        self.route_event(EventKind::Modified, route);
    }

    pub fn apply_host(&self, host: RouterHost) {
        self.host_event(EventKind::Modified, host);
    }

    pub fn remove_route(&self, url: &str) -> Option<Route> {
        self.0.lock().routes.remove(url)
    }

    pub fn remove_host(&self, name: &str) -> Option<RouterHost> {
        self.0.lock().router_hosts.remove(name)
    }

    /// Returns an independent copy of both tables.
    pub fn snapshot(&self) -> ClusterSnapshot {
        self.0.lock().clone()
    }

    pub fn route_count(&self) -> usize {
        self.0.lock().routes.len()
    }

    pub fn host_count(&self) -> usize {
        self.0.lock().router_hosts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouterPorts;

    fn host(name: &str, ip: &str) -> RouterHost {
        RouterHost::new(name, ip, RouterPorts::default())
    }

    #[test]
    fn added_then_deleted_routes() {
        let store = Store::default();
        store.route_event(EventKind::Added, Route::new("a.example.com"));
        store.route_event(EventKind::Added, Route::new("b.example.com"));
        store.route_event(EventKind::Deleted, Route::new("a.example.com"));

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.routes,
            Some((
                "b.example.com".to_string(),
                Route {
                    url: "b.example.com".to_string(),
                    weight: 1,
                },
            ))
            .into_iter()
            .collect::<RouteTable>()
        );
        assert!(snapshot.router_hosts.is_empty());
    }

    #[test]
    fn last_event_wins() {
        let sequences: Vec<Vec<(EventKind, u32)>> = vec![
            vec![(EventKind::Added, 1)],
            vec![(EventKind::Added, 1), (EventKind::Modified, 7)],
            vec![(EventKind::Added, 1), (EventKind::Deleted, 1)],
            vec![
                (EventKind::Added, 1),
                (EventKind::Deleted, 1),
                (EventKind::Modified, 3),
            ],
            vec![(EventKind::Deleted, 1), (EventKind::Deleted, 1)],
            vec![(EventKind::Modified, 2), (EventKind::Added, 5)],
        ];

        for events in sequences {
            let mut routes = RouteTable::new();
            for (kind, weight) in events.iter().copied() {
                let route = Route {
                    url: "a.example.com".to_string(),
                    weight,
                };
                apply_route_event(&mut routes, kind, route);
            }

            let expected = match events.last() {
                Some((EventKind::Deleted, _)) | None => None,
                Some((_, weight)) => Some(Route {
                    url: "a.example.com".to_string(),
                    weight: *weight,
                }),
            };
            assert_eq!(routes.get("a.example.com").cloned(), expected, "{events:?}");
            assert!(routes.len() <= 1);
        }
    }

    #[test]
    fn readding_is_idempotent() {
        let once = Store::default();
        once.host_event(EventKind::Added, host("router-1", "10.0.0.1"));

        let twice = Store::default();
        twice.host_event(EventKind::Added, host("router-1", "10.0.0.1"));
        twice.host_event(EventKind::Added, host("router-1", "10.0.0.1"));

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn modified_host_overwrites_in_place() {
        let store = Store::default();
        store.apply_host(host("router-1", "10.0.0.1"));
        store.apply_host(host("router-1", "10.0.0.2"));
        assert_eq!(store.host_count(), 1);
        assert_eq!(
            store.snapshot().router_hosts["router-1"].host_ip,
            "10.0.0.2"
        );

        assert!(store.remove_host("router-1").is_some());
        assert!(store.remove_host("router-1").is_none());
        assert_eq!(store.host_count(), 0);
    }

    #[test]
    fn snapshot_is_independent() {
        let store = Store::default();
        store.apply_route(Route::new("a.example.com"));
        let snapshot = store.snapshot();

        store.remove_route("a.example.com");
        store.apply_route(Route::new("b.example.com"));

        assert_eq!(snapshot.routes.len(), 1);
        assert!(snapshot.routes.contains_key("a.example.com"));
        assert_eq!(store.route_count(), 1);
        assert!(store.snapshot().routes.contains_key("b.example.com"));
    }

    #[test]
    fn snapshot_during_concurrent_mutation() {
        let store = Store::default();
        let writers = (0..4)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..500u32 {
                        let name = format!("router-{w}-{}", i % 8);
                        store.apply_host(RouterHost {
                            name: name.clone(),
                            host_ip: format!("10.{w}.0.{}", i % 250),
                            http_port: (i % 1000) as u16,
                            https_port: (i % 1000) as u16 + 1,
                        });
                        store.apply_route(Route {
                            url: format!("{name}.example.com"),
                            weight: i,
                        });
                        if i % 3 == 0 {
                            store.remove_route(&format!("{name}.example.com"));
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        for _ in 0..200 {
            let snapshot = store.snapshot();
            for (url, route) in &snapshot.routes {
                assert_eq!(url, &route.url);
            }
            for (name, host) in &snapshot.router_hosts {
                assert_eq!(name, &host.name);
                assert_eq!(host.https_port, host.http_port + 1);
                let writer = name.split('-').nth(1).expect("writer index");
                assert!(host.host_ip.starts_with(&format!("10.{writer}.")));
            }
        }

        for writer in writers {
            writer.join().expect("writer must not panic");
        }
        assert_eq!(store.host_count(), 32);
    }

    #[test]
    fn wire_format() {
        let store = Store::default();
        store.apply_route(Route::new("a.example.com"));
        store.apply_host(host("router-1", "10.0.0.1"));

        let json = serde_json::to_value(store.snapshot()).expect("snapshot must serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "routes": {
                    "a.example.com": { "url": "a.example.com", "weight": 1 }
                },
                "routerHosts": {
                    "router-1": {
                        "name": "router-1",
                        "hostIP": "10.0.0.1",
                        "httpPort": 80,
                        "httpsPort": 443
                    }
                }
            })
        );
    }
}
