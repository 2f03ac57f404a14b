//! Smart load balancer synchronizer core
//!
//! The synchronizer mirrors two independent views of the cluster into an external load balancer
//! API:
//!
//! - A [`Route`] is an externally reachable hostname, keyed by that hostname.
//! - A [`RouterHost`] is a running router pod, keyed by pod name, addressed by the IP of the node
//!   it runs on.
//!
//! Both tables live in a single [`Store`]. Watches mutate the store as events arrive; a publisher
//! periodically takes a [`ClusterSnapshot`] of it and ships the snapshot to the configured
//! destinations.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod state;

pub use self::state::{apply_host_event, apply_route_event, HostTable, RouteTable, Store};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The weight assigned to every route.
///
/// Weights are not yet derived from traffic; the field exists on the wire so that they may vary
/// without changing the payload format.
pub const DEFAULT_WEIGHT: u32 = 1;

/// The kind of change a watch observed for a resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
}

/// An externally reachable hostname.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub url: String,
    pub weight: u32,
}

/// A running router instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterHost {
    pub name: String,
    #[serde(rename = "hostIP")]
    pub host_ip: String,
    pub http_port: u16,
    pub https_port: u16,
}

/// The ports every router pod listens on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RouterPorts {
    pub http: u16,
    pub https: u16,
}

/// The payload published for a cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    pub routes: RouteTable,
    pub router_hosts: HostTable,
}

// === impl EventKind ===

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Modified => f.write_str("modified"),
            Self::Deleted => f.write_str("deleted"),
        }
    }
}

// === impl Route ===

impl Route {
    pub fn new(url: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            weight: DEFAULT_WEIGHT,
        }
    }
}

// === impl RouterHost ===

impl RouterHost {
    pub fn new(name: impl ToString, host_ip: impl ToString, ports: RouterPorts) -> Self {
        Self {
            name: name.to_string(),
            host_ip: host_ip.to_string(),
            http_port: ports.http,
            https_port: ports.https,
        }
    }
}

// === impl RouterPorts ===

impl Default for RouterPorts {
    fn default() -> Self {
        Self {
            http: 80,
            https: 443,
        }
    }
}

// === impl ClusterSnapshot ===

impl ClusterSnapshot {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.router_hosts.is_empty()
    }
}
