use crate::router::{self, RouterSelector};
use smartlb_controller_core::{EventKind, Route, RouterHost, RouterPorts, Store};
use smartlb_controller_k8s_api::{self as k8s, ResourceExt};
use std::{collections::BTreeSet, fmt};
use tracing::{debug, trace};

/// The resource kinds a router plugin may be asked to handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Route,
    Pod,
    Endpoints,
    Namespace,
    Node,
}

/// Describes how a plugin participates in a resource kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Events update the plugin's state.
    Tracked,

    /// Events are accepted and discarded.
    Ignored,

    /// The plugin does not handle the resource kind at all.
    Unsupported,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("{0} handling is not implemented for this plugin")]
    Unsupported(ResourceKind),
}

/// Receives the resource events admitted by the watch layer.
///
/// Implementations are invoked concurrently from independent watches and must synchronize
/// internally.
pub trait RouterPlugin {
    fn capability(&self, kind: ResourceKind) -> Capability;

    fn handle_route(&self, event: EventKind, route: &k8s::Route) -> Result<(), PluginError>;

    fn handle_host(&self, event: EventKind, pod: &k8s::Pod) -> Result<(), PluginError>;

    fn handle_endpoints(
        &self,
        event: EventKind,
        endpoints: &k8s::Endpoints,
    ) -> Result<(), PluginError>;

    fn handle_namespaces(&self, namespaces: &BTreeSet<String>) -> Result<(), PluginError>;

    fn handle_node(&self, event: EventKind, node: &k8s::Node) -> Result<(), PluginError>;

    /// Acknowledges a batch of events.
    fn commit(&self) -> Result<(), PluginError>;
}

/// Mirrors routes and router hosts into a [`Store`].
///
/// Nothing is flushed on commit: the store is published periodically.
#[derive(Clone, Debug)]
pub struct SmartLb {
    store: Store,
    routers: RouterSelector,
    ports: RouterPorts,
}

// === impl ResourceKind ===

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route => f.write_str("route"),
            Self::Pod => f.write_str("pod"),
            Self::Endpoints => f.write_str("endpoints"),
            Self::Namespace => f.write_str("namespace"),
            Self::Node => f.write_str("node"),
        }
    }
}

// === impl SmartLb ===

impl SmartLb {
    pub fn new(store: Store, routers: RouterSelector, ports: RouterPorts) -> Self {
        Self {
            store,
            routers,
            ports,
        }
    }
}

impl RouterPlugin for SmartLb {
    fn capability(&self, kind: ResourceKind) -> Capability {
        match kind {
            ResourceKind::Route | ResourceKind::Pod => Capability::Tracked,
            ResourceKind::Endpoints => Capability::Ignored,
            ResourceKind::Namespace | ResourceKind::Node => Capability::Unsupported,
        }
    }

    fn handle_route(&self, event: EventKind, route: &k8s::Route) -> Result<(), PluginError> {
        let host = route.spec.host.as_str();
        debug!(
            ns = ?route.namespace(),
            name = %route.name_any(),
            service = %route.spec.to.name,
            %host,
            path = ?route.spec.path,
            %event,
            "Processing route"
        );

        if host.is_empty() {
            debug!("Skipping route without a host");
            return Ok(());
        }

        self.store.route_event(event, Route::new(host));
        Ok(())
    }

    fn handle_host(&self, event: EventKind, pod: &k8s::Pod) -> Result<(), PluginError> {
        if !self.routers.selects(pod) {
            trace!(ns = ?pod.namespace(), name = %pod.name_any(), "Ignoring non-router pod");
            return Ok(());
        }

        let name = pod.name_any();
        match router::host_ip(pod) {
            Some(host_ip) if event != EventKind::Deleted => {
                debug!(%name, %host_ip, %event, "Updating router host");
                self.store
                    .host_event(event, RouterHost::new(name, host_ip, self.ports));
            }
            _ => {
                if self.store.remove_host(&name).is_some() {
                    debug!(%name, %event, "Removed router host");
                }
            }
        }
        Ok(())
    }

    fn handle_endpoints(
        &self,
        _event: EventKind,
        _endpoints: &k8s::Endpoints,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn handle_namespaces(&self, _namespaces: &BTreeSet<String>) -> Result<(), PluginError> {
        Err(PluginError::Unsupported(ResourceKind::Namespace))
    }

    fn handle_node(&self, _event: EventKind, _node: &k8s::Node) -> Result<(), PluginError> {
        Err(PluginError::Unsupported(ResourceKind::Node))
    }

    fn commit(&self) -> Result<(), PluginError> {
        Ok(())
    }
}
