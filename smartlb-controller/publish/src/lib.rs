//! Periodic publication of cluster snapshots
//!
//! A single [`Publisher`] task wakes on a fixed interval, copies the
//! [`Store`](smartlb_controller_core::Store) and posts the
//! serialized snapshot to `<destination>/api/cluster/<cluster-key>` for every configured
//! destination. Each cycle is independent: failures are logged and counted, never retried, and
//! one unreachable destination does not prevent delivery to the others.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod destination;
mod metrics;
mod publisher;
mod transport;


pub use self::{
    destination::{ClusterKey, ConfigError, Destinations},
    metrics::PublishMetrics,
    publisher::{Cycle, Publisher},
    transport::{HttpTransport, Transport},
};
