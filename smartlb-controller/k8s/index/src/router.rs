use smartlb_controller_k8s_api::{self as k8s, ResourceExt};

/// Identifies the pods of the router workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterSelector {
    /// The namespace in which the router is deployed.
    pub namespace: String,

    /// Labels carried by every router pod.
    pub selector: k8s::Selector,
}

// === impl RouterSelector ===

impl RouterSelector {
    pub fn new(namespace: impl ToString, selector: k8s::Selector) -> Self {
        Self {
            namespace: namespace.to_string(),
            selector,
        }
    }

    pub fn selects(&self, pod: &k8s::Pod) -> bool {
        if pod.namespace().as_deref() != Some(self.namespace.as_str()) {
            return false;
        }
        let labels = k8s::Labels::from(pod.metadata.labels.clone());
        self.selector.matches(&labels)
    }
}

/// Returns the IP of the node the pod is scheduled on, if it has been assigned.
pub(crate) fn host_ip(pod: &k8s::Pod) -> Option<&str> {
    pod.status
        .as_ref()?
        .host_ip
        .as_deref()
        .filter(|ip| !ip.is_empty())
}
