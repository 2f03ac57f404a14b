use crate::plugin::RouterPlugin;
use ahash::AHashMap as HashMap;
use parking_lot::RwLock;
use smartlb_controller_core::EventKind;
use smartlb_controller_k8s_api::{self as k8s, ResourceExt, WildcardPolicy};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{info, trace, warn};

pub type SharedIndex<P> = Arc<RwLock<Index<P>>>;

/// Adapts watch updates into plugin events.
///
/// Watches only report the namespace and name of a deleted resource, so the last applied version
/// of each resource is retained to build the deleted event.
///
/// Several routes may claim the same host. A host is only deleted from the plugin once its last
/// admitted claimant goes away.
#[derive(Debug)]
pub struct Index<P> {
    plugin: P,
    routes: HashMap<ResourceId, k8s::Route>,
    claims: HashMap<String, BTreeSet<ResourceId>>,
    pods: HashMap<ResourceId, k8s::Pod>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("wildcard routes are not supported by this plugin")]
    Wildcard,

    #[error("unknown wildcard policy")]
    UnknownWildcardPolicy,
}

/// Rejects routes the load balancer cannot serve.
pub fn admit_route(route: &k8s::Route) -> Result<(), AdmissionError> {
    match route.wildcard_policy() {
        WildcardPolicy::None => Ok(()),
        WildcardPolicy::Subdomain => Err(AdmissionError::Wildcard),
        WildcardPolicy::Unknown => Err(AdmissionError::UnknownWildcardPolicy),
    }
}

// === impl ResourceId ===

impl ResourceId {
    pub fn new(namespace: String, name: String) -> Self {
        Self { namespace, name }
    }
}

// === impl Index ===

impl<P: RouterPlugin> Index<P> {
    pub fn new(plugin: P) -> Self {
        Self {
            plugin,
            routes: HashMap::default(),
            claims: HashMap::default(),
            pods: HashMap::default(),
        }
    }

    pub fn shared(plugin: P) -> SharedIndex<P> {
        Arc::new(RwLock::new(Self::new(plugin)))
    }

    pub fn routes_len(&self) -> usize {
        self.routes.len()
    }

    pub fn pods_len(&self) -> usize {
        self.pods.len()
    }

    fn route(&self, event: EventKind, route: &k8s::Route) {
        if let Err(error) = self.plugin.handle_route(event, route) {
            warn!(%error, name = %route.name_any(), %event, "Failed to handle route");
        }
    }

    /// Drops `id`'s claim on the host of `prior`, which must no longer be in `routes`.
    ///
    /// The host is deleted when nobody else claims it; otherwise a remaining claimant is
    /// re-announced so the host stays in the table.
    fn release(&mut self, id: &ResourceId, prior: &k8s::Route) {
        let host = &prior.spec.host;
        let remaining = match self.claims.get_mut(host) {
            Some(claimants) => {
                claimants.remove(id);
                claimants.iter().next().cloned()
            }
            None => None,
        };

        match remaining.and_then(|other| self.routes.get(&other)) {
            Some(other) => {
                trace!(%host, ns = %id.namespace, name = %id.name, "Host is still claimed");
                self.route(EventKind::Modified, other);
            }
            None => {
                self.claims.remove(host);
                self.route(EventKind::Deleted, prior);
            }
        }
    }

    fn host(&self, event: EventKind, pod: &k8s::Pod) {
        if let Err(error) = self.plugin.handle_host(event, pod) {
            warn!(%error, name = %pod.name_any(), %event, "Failed to handle pod");
        }
    }

    fn commit(&self) {
        if let Err(error) = self.plugin.commit() {
            warn!(%error, "Failed to commit");
        }
    }
}

impl<P: RouterPlugin> kubert::index::IndexNamespacedResource<k8s::Route> for Index<P> {
    fn apply(&mut self, route: k8s::Route) {
        let namespace = route.namespace().expect("Route must have a namespace");
        let name = route.name_unchecked();
        let id = ResourceId::new(namespace.clone(), name.clone());

        if let Err(error) = admit_route(&route) {
            info!(%namespace, %name, %error, "Ignoring route");
            if let Some(prior) = self.routes.remove(&id) {
                self.release(&id, &prior);
            }
            self.commit();
            return;
        }

        let event = match self.routes.remove(&id) {
            None => EventKind::Added,
            Some(prior) => {
                // A route's host may be edited in place; the old hostname must not linger.
                if prior.spec.host != route.spec.host {
                    self.release(&id, &prior);
                }
                EventKind::Modified
            }
        };
        self.claims
            .entry(route.spec.host.clone())
            .or_default()
            .insert(id.clone());
        self.route(event, &route);
        self.routes.insert(id, route);
        self.commit();
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        match self.routes.remove(&id) {
            Some(route) => {
                self.release(&id, &route);
                self.commit();
            }
            None => trace!(ns = %id.namespace, name = %id.name, "Route was not indexed"),
        }
    }
}

impl<P: RouterPlugin> kubert::index::IndexNamespacedResource<k8s::Pod> for Index<P> {
    fn apply(&mut self, pod: k8s::Pod) {
        let namespace = pod.namespace().expect("Pod must have a namespace");
        let name = pod.name_unchecked();
        let id = ResourceId::new(namespace, name);

        let event = if self.pods.contains_key(&id) {
            EventKind::Modified
        } else {
            EventKind::Added
        };
        self.host(event, &pod);
        self.pods.insert(id, pod);
        self.commit();
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        match self.pods.remove(&id) {
            Some(pod) => {
                self.host(EventKind::Deleted, &pod);
                self.commit();
            }
            None => trace!(ns = %id.namespace, name = %id.name, "Pod was not indexed"),
        }
    }
}
