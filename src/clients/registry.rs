use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use k8s_openapi::api::core::v1::{Node, Pod};
use tokio::sync::RwLock;
use tokio::time::{self, Duration};
use tracing::{info, warn};

use super::{ClusterApi, KubeCluster};
use crate::config::{ClusterDef, Config, Timeouts};
use crate::error::{FetchError, FetchResult};
use crate::helpers::age_since;
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{ClusterHealth, ComponentStatus};

const SYSTEM_NAMESPACE: &str = "kube-system";
const CONTROL_PLANE_SELECTORS: [&str; 2] = ["component=kube-apiserver", "component=etcd"];
const CORE_DNS_SELECTOR: &str = "k8s-app=kube-dns";

/// Registered clusters and the last health probe of each.
pub struct ClusterRegistry {
    defs: BTreeMap<String, ClusterDef>,
    timeouts: Timeouts,
    health: RwLock<HashMap<String, ClusterHealth>>,
}

impl ClusterRegistry {
    pub fn new(defs: Vec<ClusterDef>, timeouts: Timeouts) -> Self {
        let health = defs
            .iter()
            .map(|d| (d.name.clone(), ClusterHealth::unprobed(&d.name, &d.context)))
            .collect();
        Self {
            defs: defs.into_iter().map(|d| (d.name.clone(), d)).collect(),
            timeouts,
            health: RwLock::new(health),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.clusters.clone(), cfg.timeouts())
    }

    pub fn names(&self) -> Vec<String> {
        self.defs.keys().cloned().collect()
    }

    pub fn def(&self, name: &str) -> FetchResult<&ClusterDef> {
        self.defs
            .get(name)
            .ok_or_else(|| FetchError::UnknownCluster(name.to_string()))
    }

    /// Builds a new client for `name`; nothing is reused between requests.
    pub async fn connect(&self, name: &str) -> FetchResult<KubeCluster> {
        let def = self.def(name)?;
        KubeCluster::connect(def, self.timeouts).await
    }

    pub async fn health(&self) -> Vec<ClusterHealth> {
        let health = self.health.read().await;
        self.defs
            .keys()
            .filter_map(|name| health.get(name).cloned())
            .map(|mut h| {
                h.last_probe_age = h.last_probe.map(age_since);
                h
            })
            .collect()
    }

    pub async fn run_health_checker(
        self: Arc<Self>,
        every: Duration,
        mut shutdown: tokio::sync::watch::Receiver<()>,
    ) {
        self.probe_all().await;

        let mut interval = time::interval(every);
        interval.tick().await; // skip first immediate tick

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.probe_all().await;
                }
                _ = shutdown.changed() => {
                    info!("health checker shutting down");
                    return;
                }
            }
        }
    }

    async fn probe_all(&self) {
        let results = join_all(self.defs.values().map(|def| async move {
            match KubeCluster::connect(def, self.timeouts).await {
                Ok(cluster) => probe(&cluster, &def.name, &def.context).await,
                Err(e) => unavailable(&def.name, &def.context, &e),
            }
        }))
        .await;

        let mut health = self.health.write().await;
        for h in results {
            if !h.reachable {
                warn!(
                    "cluster {} is unavailable: {}",
                    h.name,
                    h.error.as_deref().unwrap_or("unknown error")
                );
            }
            health.insert(h.name.clone(), h);
        }
    }
}

fn unavailable(name: &str, context: &str, err: &FetchError) -> ClusterHealth {
    ClusterHealth {
        error: Some(err.to_string()),
        last_probe: Some(Utc::now()),
        ..ClusterHealth::unprobed(name, context)
    }
}

/// Counts nodes and checks the control plane and CoreDNS pods in `kube-system`.
/// Any failed call marks the whole cluster unavailable.
pub async fn probe<C: ClusterApi>(cluster: &C, name: &str, context: &str) -> ClusterHealth {
    match probe_inner(cluster, name, context).await {
        Ok(h) => h,
        Err(e) => unavailable(name, context, &e),
    }
}

async fn probe_inner<C: ClusterApi>(
    cluster: &C,
    name: &str,
    context: &str,
) -> FetchResult<ClusterHealth> {
    let version = cluster.server_version().await?;
    let nodes: Vec<Node> = cluster.list_cluster(&ListOptions::default()).await?;

    let scope = Scope::Namespace(SYSTEM_NAMESPACE.to_string());
    let mut failed_control_pods = Vec::new();
    for selector in CONTROL_PLANE_SELECTORS {
        failed_control_pods.extend(failed_pods(cluster, &scope, selector).await?);
    }
    let failed_dns_pods = failed_pods(cluster, &scope, CORE_DNS_SELECTOR).await?;

    Ok(ClusterHealth {
        reachable: true,
        server_version: Some(version),
        number_of_nodes: Some(nodes.len()),
        control_plane_status: component_status(&failed_control_pods),
        core_dns_status: component_status(&failed_dns_pods),
        failed_control_pods,
        failed_dns_pods,
        last_probe: Some(Utc::now()),
        ..ClusterHealth::unprobed(name, context)
    })
}

async fn failed_pods<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    selector: &str,
) -> FetchResult<Vec<String>> {
    let pods: Vec<Pod> = cluster
        .list(scope, &ListOptions::default().labels(selector))
        .await?;
    Ok(pods
        .into_iter()
        .filter(|p| p.status.as_ref().and_then(|s| s.phase.as_deref()) != Some("Running"))
        .filter_map(|p| p.metadata.name)
        .collect())
}

fn component_status(failed: &[String]) -> ComponentStatus {
    if failed.is_empty() {
        ComponentStatus::Running
    } else {
        ComponentStatus::Unhealthy
    }
}
