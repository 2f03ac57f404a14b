use crate::{plugin::RouterPlugin, Index};
use kubert::index::NamespacedRemoved;
use parking_lot::RwLock;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};
use smartlb_controller_k8s_api::{self as k8s, ResourceExt};
use std::sync::Arc;

/// Records index activity before delegating to an inner index.
pub struct IndexMetrics<T> {
    inner: T,

    index_size: Family<IndexLabels, Gauge>,
    index_applies: Family<NamespacedIndexLabels, Counter>,
    index_deletes: Family<NamespacedIndexLabels, Counter>,
    index_resets: Family<IndexLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct NamespacedIndexLabels {
    namespace: String,
    kind: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct IndexLabels {
    kind: String,
}

pub trait SizedIndex<R> {
    fn size(&self) -> usize;
}

impl<T, R> SizedIndex<R> for Arc<RwLock<T>>
where
    T: SizedIndex<R>,
{
    fn size(&self) -> usize {
        self.read().size()
    }
}

impl<P: RouterPlugin> SizedIndex<k8s::Route> for Index<P> {
    fn size(&self) -> usize {
        self.routes_len()
    }
}

impl<P: RouterPlugin> SizedIndex<k8s::Pod> for Index<P> {
    fn size(&self) -> usize {
        self.pods_len()
    }
}

impl<T> IndexMetrics<T> {
    pub fn register(inner: T, prom: &mut Registry) -> Self {
        let index_size = Family::default();
        prom.register(
            "index_size",
            "Gauge of the number of resources in the index",
            index_size.clone(),
        );

        let index_applies = Family::default();
        prom.register(
            "index_applies",
            "Count of applies to the index",
            index_applies.clone(),
        );

        let index_deletes = Family::default();
        prom.register(
            "index_deletes",
            "Count of deletes to the index",
            index_deletes.clone(),
        );

        let index_resets = Family::default();
        prom.register(
            "index_resets",
            "Count of resets to the index",
            index_resets.clone(),
        );

        Self {
            inner,
            index_size,
            index_applies,
            index_deletes,
            index_resets,
        }
    }

    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    fn record_size<R>(&self)
    where
        T: SizedIndex<R>,
        R: ResourceExt<DynamicType = ()>,
    {
        self.index_size
            .get_or_create(&IndexLabels {
                kind: R::kind(&()).to_string(),
            })
            .set(self.inner.size() as i64);
    }
}

impl<R, T> kubert::index::IndexNamespacedResource<R> for IndexMetrics<Arc<RwLock<T>>>
where
    T: SizedIndex<R>,
    T: kubert::index::IndexNamespacedResource<R>,
    R: ResourceExt<DynamicType = ()>,
{
    fn apply(&mut self, resource: R) {
        self.index_applies
            .get_or_create(&NamespacedIndexLabels {
                namespace: resource.namespace().unwrap_or_default(),
                kind: R::kind(&()).to_string(),
            })
            .inc();
        self.inner.write().apply(resource);
        self.record_size::<R>();
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.index_deletes
            .get_or_create(&NamespacedIndexLabels {
                namespace: namespace.clone(),
                kind: R::kind(&()).to_string(),
            })
            .inc();
        self.inner.write().delete(namespace, name);
        self.record_size::<R>();
    }

    fn reset(&mut self, resources: Vec<R>, removed: NamespacedRemoved) {
        self.index_resets
            .get_or_create(&IndexLabels {
                kind: R::kind(&()).to_string(),
            })
            .inc();
        self.inner.write().reset(resources, removed);
        self.record_size::<R>();
    }
}
