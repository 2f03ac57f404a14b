use crate::{
    core::{RouterPorts, Store},
    index::{metrics::IndexMetrics, Index, RouterSelector, SmartLb},
    k8s::{self, watcher},
    publish::{ClusterKey, Destinations, HttpTransport, PublishMetrics, Publisher},
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "smartlb",
    about = "Synchronizes the current routes to the external smart load balancer"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "smartlb=info,warn",
        env = "SMARTLB_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Comma-separated URLs of the smart load balancer APIs.
    #[clap(long, env = "SMART_LB_API_URLS", default_value = "")]
    smart_lb_api_urls: String,

    /// Uniquely identifies this cluster to the smart load balancer.
    #[clap(long, env = "CLUSTER_KEY", default_value = "")]
    cluster_key: String,

    #[clap(long, default_value = "5000")]
    publish_interval_ms: u64,

    /// Bounds each request to a smart load balancer API.
    #[clap(long, default_value = "10000")]
    publish_timeout_ms: u64,

    /// The namespace in which the router is deployed.
    #[clap(long, env = "ROUTER_NAMESPACE", default_value = "default")]
    router_namespace: String,

    /// Labels that identify router pods.
    #[clap(long, default_value = "deploymentconfig=router")]
    router_selector: k8s::Selector,

    #[clap(long, default_value = "80")]
    router_http_port: u16,

    #[clap(long, default_value = "443")]
    router_https_port: u16,

    /// Only routes matching these labels are published.
    #[clap(long)]
    route_labels: Option<k8s::Selector>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            smart_lb_api_urls,
            cluster_key,
            publish_interval_ms,
            publish_timeout_ms,
            router_namespace,
            router_selector,
            router_http_port,
            router_https_port,
            route_labels,
        } = self;

        // Configuration errors are fatal before anything is started.
        let destinations = smart_lb_api_urls.parse::<Destinations>()?;
        let cluster_key = cluster_key.parse::<ClusterKey>()?;
        if publish_interval_ms == 0 {
            bail!("--publish-interval-ms must be greater than zero");
        }
        let transport = HttpTransport::new(Duration::from_millis(publish_timeout_ms))
            .context("failed to build smart load balancer client")?;

        let store = Store::default();
        let routers = RouterSelector::new(&router_namespace, router_selector.clone());
        let ports = RouterPorts {
            http: router_http_port,
            https: router_https_port,
        };
        let index = Index::shared(SmartLb::new(store.clone(), routers, ports));

        let mut prom = <Registry>::default();
        let smartlb = prom.sub_registry_with_prefix("smartlb");
        let index_metrics = IndexMetrics::register(index, smartlb).shared();
        let publish_metrics = PublishMetrics::register(smartlb);
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        info!(%destinations, %cluster_key, "Starting smart load balancer synchronizer");

        // Spawn resource watches.

        let route_watch = match route_labels.as_ref() {
            Some(labels) => watcher::Config::default().labels(&labels.to_string()),
            None => watcher::Config::default(),
        };
        let routes = runtime.watch_all::<k8s::Route>(route_watch);
        tokio::spawn(
            kubert::index::namespaced(index_metrics.clone(), routes)
                .instrument(info_span!("routes")),
        );

        let pod_watch = if router_selector.is_empty() {
            watcher::Config::default()
        } else {
            watcher::Config::default().labels(&router_selector.to_string())
        };
        let pods = runtime.watch_namespaced::<k8s::Pod>(router_namespace, pod_watch);
        tokio::spawn(
            kubert::index::namespaced(index_metrics, pods).instrument(info_span!("pods")),
        );

        // Spawn the publisher. It stops once the runtime begins shutting down.
        let publisher = Publisher::new(
            store,
            &destinations,
            &cluster_key,
            transport,
            Duration::from_millis(publish_interval_ms),
            publish_metrics,
        );
        let shutdown = runtime.shutdown_handle();
        tokio::spawn(
            publisher
                .run(shutdown.signaled())
                .instrument(info_span!("publisher")),
        );

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
