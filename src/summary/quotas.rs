//! Resource quotas, limit ranges and pod disruption budgets.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{LimitRange, ResourceQuota};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{LimitRangeView, PodDisruptionBudgetView, ResourceQuotaView};

fn quantities(map: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, String> {
    map.into_iter()
        .flatten()
        .map(|(k, q)| (k.clone(), q.0.clone()))
        .collect()
}

/// Enforced limits come from the status; a quota the controller has not
/// reconciled yet falls back to its spec.
pub fn resource_quota_view(rq: &ResourceQuota, now: DateTime<Utc>) -> ResourceQuotaView {
    let status = rq.status.as_ref();
    let hard = status
        .and_then(|s| s.hard.as_ref())
        .or_else(|| rq.spec.as_ref().and_then(|s| s.hard.as_ref()));
    let hard = quantities(hard);
    let limit = |key: &str| hard.get(key).cloned().unwrap_or_else(|| "N/A".to_string());

    ResourceQuotaView {
        namespace: namespace_of(&rq.metadata),
        name: name_of(&rq.metadata),
        requests_cpu: limit("requests.cpu"),
        limits_cpu: limit("limits.cpu"),
        used: quantities(status.and_then(|s| s.used.as_ref())),
        age: age_of(rq.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        hard,
    }
}

pub async fn list_resource_quotas<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<ResourceQuotaView>> {
    let items: Vec<ResourceQuota> = logged(
        "resourcequotas",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items.iter().map(|rq| resource_quota_view(rq, now)).collect())
}

pub async fn list_limit_ranges<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<LimitRangeView>> {
    let items: Vec<LimitRange> = logged(
        "limitranges",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items
        .iter()
        .map(|lr| LimitRangeView {
            namespace: namespace_of(&lr.metadata),
            name: name_of(&lr.metadata),
            types: lr
                .spec
                .iter()
                .flat_map(|s| s.limits.iter())
                .map(|item| item.type_.clone())
                .collect(),
            age: age_of(lr.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        })
        .collect())
}

fn int_or_string(v: Option<&IntOrString>) -> String {
    match v {
        Some(IntOrString::Int(n)) => n.to_string(),
        Some(IntOrString::String(s)) => s.clone(),
        None => "N/A".to_string(),
    }
}

pub fn pdb_view(pdb: &PodDisruptionBudget, now: DateTime<Utc>) -> PodDisruptionBudgetView {
    let spec = pdb.spec.as_ref();

    PodDisruptionBudgetView {
        namespace: namespace_of(&pdb.metadata),
        name: name_of(&pdb.metadata),
        min_available: int_or_string(spec.and_then(|s| s.min_available.as_ref())),
        max_unavailable: int_or_string(spec.and_then(|s| s.max_unavailable.as_ref())),
        disruptions_allowed: pdb.status.as_ref().map(|s| s.disruptions_allowed).unwrap_or(0),
        age: age_of(pdb.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_pod_disruption_budgets<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<PodDisruptionBudgetView>> {
    let items: Vec<PodDisruptionBudget> = logged(
        "poddisruptionbudgets",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items.iter().map(|p| pdb_view(p, now)).collect())
}
