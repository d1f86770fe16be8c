//! Per-kind summarizers: list a kind for a scope, flatten each object into a
//! view row, and fold status tallies. Every function returns a `FetchResult`
//! and logs the failure where it happens.

pub mod access;
pub mod config_data;
pub mod cronjobs;
pub mod daemonsets;
pub mod deployments;
pub mod describe;
pub mod events;
pub mod jobs;
pub mod namespaces;
pub mod networking;
pub mod nodes;
pub mod overview;
pub mod pods;
pub mod quotas;
pub mod replicasets;
pub mod service_accounts;
pub mod services;
pub mod statefulsets;
pub mod yaml;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{debug, warn};

use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::models::k8s::{NamespacedKind, Scope};
use crate::status::{StatusLabel, StatusTally};

/// Logs the outcome of listing `kind` in `scope` and passes it through.
pub(crate) fn logged<T>(kind: &str, scope: &Scope, res: FetchResult<Vec<T>>) -> FetchResult<Vec<T>> {
    match &res {
        Ok(items) => debug!("listed {} {} in {}", items.len(), kind, scope),
        Err(e) => warn!("error listing {} in {}: {}", kind, scope, e),
    }
    res
}

/// Fetches one object, logging a failure with its kind and location.
pub(crate) async fn read<K, C>(cluster: &C, namespace: &str, name: &str) -> FetchResult<K>
where
    K: NamespacedKind,
    C: ClusterApi,
{
    cluster.get(namespace, name).await.inspect_err(|e| {
        warn!("error reading {} {}/{}: {}", K::kind(&()), namespace, name, e);
    })
}

pub(crate) fn log_tally(kind: &str, scope: &Scope, tally: StatusTally) -> StatusTally {
    debug!(
        "tallied {} {} in {} ({} running)",
        tally.count(),
        kind,
        scope,
        tally.get(StatusLabel::Running)
    );
    tally
}

pub(crate) fn namespace_of(meta: &ObjectMeta) -> String {
    meta.namespace.clone().unwrap_or_default()
}

pub(crate) fn name_of(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}
