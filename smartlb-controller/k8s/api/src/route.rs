use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// An OpenShift route exposing a service at an external hostname.
///
/// Only the fields the synchronizer reads or that describe how the route is admitted are modeled;
/// unknown fields are ignored on deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "route.openshift.io",
    version = "v1",
    kind = "Route",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    /// The external hostname. Routes without a host are not published.
    #[serde(default)]
    pub host: String,

    pub path: Option<String>,

    pub to: RouteTargetReference,

    pub alternate_backends: Option<Vec<RouteTargetReference>>,

    pub port: Option<RoutePort>,

    pub tls: Option<TlsConfig>,

    pub wildcard_policy: Option<WildcardPolicy>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    pub kind: String,
    pub name: String,
    pub weight: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: k8s_openapi::apimachinery::pkg::util::intstr::IntOrString,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    pub termination: String,
    pub insecure_edge_termination_policy: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum WildcardPolicy {
    None,
    Subdomain,
    #[serde(other)]
    Unknown,
}

// === impl Route ===

impl Route {
    /// Returns the route's wildcard policy, treating an unset policy as `None`.
    pub fn wildcard_policy(&self) -> WildcardPolicy {
        self.spec
            .wildcard_policy
            .clone()
            .unwrap_or(WildcardPolicy::None)
    }
}
