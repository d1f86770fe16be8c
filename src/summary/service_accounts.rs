use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::ServiceAccount;

use super::describe::object_summary;
use super::{logged, name_of, namespace_of, namespaces};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{Counted, ServiceAccountDescription, ServiceAccountView};

pub fn service_account_view(sa: &ServiceAccount, now: DateTime<Utc>) -> ServiceAccountView {
    ServiceAccountView {
        namespace: namespace_of(&sa.metadata),
        name: name_of(&sa.metadata),
        secrets: sa
            .secrets
            .iter()
            .flatten()
            .filter_map(|s| s.name.clone())
            .collect(),
        age: age_of(sa.metadata.creation_timestamp.as_ref(), AgeStyle::Composite, now),
    }
}

/// Walks namespaces one at a time and lists the accounts in each. A
/// namespace scope skips the walk.
pub async fn list_service_accounts<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Counted<ServiceAccountView>> {
    let targets: Vec<String> = match scope {
        Scope::Namespace(ns) => vec![ns.clone()],
        Scope::All => namespaces::fetch(cluster)
            .await?
            .iter()
            .map(|ns| name_of(&ns.metadata))
            .collect(),
    };

    let mut rows = Vec::new();
    for ns in targets {
        let ns_scope = Scope::Namespace(ns);
        let items: Vec<ServiceAccount> = logged(
            "serviceaccounts",
            &ns_scope,
            cluster.list(&ns_scope, &ListOptions::default()).await,
        )?;
        rows.extend(items.iter().map(|sa| service_account_view(sa, now)));
    }
    Ok(Counted::new(rows))
}

pub fn service_account_description(sa: &ServiceAccount, now: DateTime<Utc>) -> ServiceAccountDescription {
    ServiceAccountDescription {
        meta: object_summary(&sa.metadata, now),
        secrets: sa
            .secrets
            .iter()
            .flatten()
            .filter_map(|s| s.name.clone())
            .collect(),
        image_pull_secrets: sa
            .image_pull_secrets
            .iter()
            .flatten()
            .map(|s| s.name.clone())
            .collect(),
    }
}

pub async fn describe_service_account<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<ServiceAccountDescription> {
    let sa: ServiceAccount = super::read(cluster, namespace, name).await?;
    Ok(service_account_description(&sa, now))
}
