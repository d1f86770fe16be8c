use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Namespace;

use super::{logged, name_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{NameCount, NamespaceView};

pub(crate) async fn fetch<C: ClusterApi>(cluster: &C) -> FetchResult<Vec<Namespace>> {
    logged(
        "namespaces",
        &Scope::All,
        cluster.list_cluster(&ListOptions::default()).await,
    )
}

pub fn namespace_view(ns: &Namespace, now: DateTime<Utc>) -> NamespaceView {
    NamespaceView {
        name: name_of(&ns.metadata),
        status: ns
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        age: age_of(ns.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_namespaces<C: ClusterApi>(
    cluster: &C,
    now: DateTime<Utc>,
) -> FetchResult<Vec<NamespaceView>> {
    let items = fetch(cluster).await?;
    Ok(items.iter().map(|ns| namespace_view(ns, now)).collect())
}

pub async fn namespace_names<C: ClusterApi>(cluster: &C) -> FetchResult<NameCount> {
    let items = fetch(cluster).await?;
    Ok(NameCount::new(
        items.iter().map(|ns| name_of(&ns.metadata)).collect(),
    ))
}
