#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;
pub mod route;

pub use self::{
    labels::{Labels, Selector},
    route::{Route, RouteSpec, WildcardPolicy},
};
pub use k8s_openapi::api::core::v1::{Endpoints, Node, Pod, PodStatus};
pub use kube::{
    api::{ObjectMeta, ResourceExt},
    runtime::watcher,
};
