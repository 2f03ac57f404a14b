use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};
use smartlb_controller_core::ClusterSnapshot;

#[derive(Clone, Debug, Default)]
pub struct PublishMetrics {
    cycles: Counter,
    serialize_failures: Counter,
    deliveries: Family<DestinationLabels, Counter>,
    failures: Family<DestinationLabels, Counter>,
    routes: Gauge,
    router_hosts: Gauge,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DestinationLabels {
    destination: String,
}

// === impl PublishMetrics ===

impl PublishMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let metrics = Self::default();
        prom.register(
            "publish_cycles",
            "Count of publish cycles",
            metrics.cycles.clone(),
        );
        prom.register(
            "publish_serialize_failures",
            "Count of snapshots that could not be serialized",
            metrics.serialize_failures.clone(),
        );
        prom.register(
            "publish_deliveries",
            "Count of snapshots delivered to a destination",
            metrics.deliveries.clone(),
        );
        prom.register(
            "publish_failures",
            "Count of snapshots that failed to reach a destination",
            metrics.failures.clone(),
        );
        prom.register(
            "snapshot_routes",
            "Number of routes in the last published snapshot",
            metrics.routes.clone(),
        );
        prom.register(
            "snapshot_router_hosts",
            "Number of router hosts in the last published snapshot",
            metrics.router_hosts.clone(),
        );
        metrics
    }

    pub(crate) fn snapshot(&self, snapshot: &ClusterSnapshot) {
        self.cycles.inc();
        self.routes.set(snapshot.routes.len() as i64);
        self.router_hosts.set(snapshot.router_hosts.len() as i64);
    }

    pub(crate) fn serialize_failed(&self) {
        self.serialize_failures.inc();
    }

    pub(crate) fn delivered(&self, destination: &str) {
        self.deliveries
            .get_or_create(&DestinationLabels {
                destination: destination.to_string(),
            })
            .inc();
    }

    pub(crate) fn failed(&self, destination: &str) {
        self.failures
            .get_or_create(&DestinationLabels {
                destination: destination.to_string(),
            })
            .inc();
    }
}
