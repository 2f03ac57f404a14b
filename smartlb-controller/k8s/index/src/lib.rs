//! Event ingestion for the smart load balancer synchronizer
//!
//! Watches deliver `Route` and `Pod` updates to an [`Index`], which translates kubert's
//! apply/delete callbacks into added/modified/deleted events for a [`RouterPlugin`]. The
//! [`SmartLb`] plugin applies those events to the shared [`Store`](core::Store):
//!
//! ```text
//! [ Route ] -> admission -> [ Index ] -> [ SmartLb ] -> [ Store ]
//! [ Pod ]   --------------> [ Index ] -> [ SmartLb ] -> [ Store ]
//! ```
//!
//! Only pods belonging to the router workload (see [`RouterSelector`]) with a scheduled host IP
//! become router hosts. The remaining resource kinds of the plugin protocol are either ignored
//! (endpoints) or explicitly unsupported (namespaces, nodes).

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
pub mod metrics;
mod plugin;
mod router;


pub use self::{
    index::{admit_route, AdmissionError, Index, ResourceId, SharedIndex},
    plugin::{Capability, PluginError, ResourceKind, RouterPlugin, SmartLb},
    router::RouterSelector,
};
pub use smartlb_controller_core as core;
