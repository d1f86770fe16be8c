pub mod registry;

#[cfg(test)]
pub mod fake;

use std::future::Future;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client};
use tracing::{debug, warn};

use crate::config::{ClusterDef, Timeouts};
use crate::error::{FetchError, FetchResult};
use crate::models::k8s::{ClusterKind, ListOptions, NamespacedKind, Scope};

/// Read access to one cluster's objects.
pub trait ClusterApi: Send + Sync {
    /// Lists a namespaced kind, in one namespace or all of them.
    fn list<K: NamespacedKind>(
        &self,
        scope: &Scope,
        opts: &ListOptions,
    ) -> impl Future<Output = FetchResult<Vec<K>>> + Send;

    /// Lists a cluster-scoped kind such as `Node` or `Namespace`.
    fn list_cluster<K: ClusterKind>(
        &self,
        opts: &ListOptions,
    ) -> impl Future<Output = FetchResult<Vec<K>>> + Send;

    fn get<K: NamespacedKind>(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = FetchResult<K>> + Send;

    fn server_version(&self) -> impl Future<Output = FetchResult<String>> + Send;
}

/// A freshly authenticated connection to a registered cluster.
#[derive(Clone)]
pub struct KubeCluster {
    name: String,
    client: Client,
    timeouts: Timeouts,
}

impl KubeCluster {
    pub async fn connect(def: &ClusterDef, timeouts: Timeouts) -> FetchResult<Self> {
        // Reading the kubeconfig is file I/O; keep it off the runtime threads.
        let path = def.kubeconfig.clone();
        let kubeconfig = tokio::task::spawn_blocking(move || Kubeconfig::read_from(path))
            .await
            .map_err(|e| FetchError::Config(format!("kubeconfig reader failed: {}", e)))??;

        let mut config = kube::Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: Some(def.context.clone()),
                ..Default::default()
            },
        )
        .await?;
        config.connect_timeout = Some(timeouts.connect);
        config.read_timeout = Some(timeouts.request);

        let client = Client::try_from(config)?;
        debug!("connected to cluster {} (context {})", def.name, def.context);

        Ok(Self {
            name: def.name.clone(),
            client,
            timeouts,
        })
    }

    /// Bounds a cluster call by the request timeout.
    async fn bounded<T, F>(&self, fut: F) -> FetchResult<T>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.timeouts.request, fut).await {
            Ok(res) => res.map_err(FetchError::from),
            Err(_) => {
                warn!("call to cluster {} timed out after {:?}", self.name, self.timeouts.request);
                Err(FetchError::Timeout(self.timeouts.request))
            }
        }
    }
}

impl ClusterApi for KubeCluster {
    async fn list<K: NamespacedKind>(&self, scope: &Scope, opts: &ListOptions) -> FetchResult<Vec<K>> {
        let api: Api<K> = match scope {
            Scope::All => Api::all(self.client.clone()),
            Scope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        };
        let list = self.bounded(api.list(&opts.to_params())).await?;
        Ok(list.items)
    }

    async fn list_cluster<K: ClusterKind>(&self, opts: &ListOptions) -> FetchResult<Vec<K>> {
        let api: Api<K> = Api::all(self.client.clone());
        let list = self.bounded(api.list(&opts.to_params())).await?;
        Ok(list.items)
    }

    async fn get<K: NamespacedKind>(&self, namespace: &str, name: &str) -> FetchResult<K> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        self.bounded(api.get(name)).await
    }

    async fn server_version(&self) -> FetchResult<String> {
        let info = self.bounded(self.client.apiserver_version()).await?;
        Ok(info.git_version)
    }
}
