use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;

use super::describe::{object_summary, pod_template_view, selector_labels};
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{DeploymentView, ReplicaSummary, WorkloadDescription};
use crate::status::{ReplicaCounts, StatusLabel, StatusTally, classify_replicas};

pub const REPLICA_BUCKETS: [StatusLabel; 2] = [StatusLabel::Running, StatusLabel::Pending];

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<Deployment>> {
    logged(
        "deployments",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )
}

fn replica_counts(d: &Deployment) -> ReplicaCounts {
    d.status
        .as_ref()
        .map(|s| ReplicaCounts {
            replicas: s.replicas,
            ready: s.ready_replicas,
            available: s.available_replicas,
        })
        .unwrap_or_default()
}

pub fn deployment_view(d: &Deployment, now: DateTime<Utc>) -> DeploymentView {
    let counts = replica_counts(d);
    let ready = counts.ready.unwrap_or(0);
    let desired = d.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);

    DeploymentView {
        namespace: namespace_of(&d.metadata),
        name: name_of(&d.metadata),
        ready: format!("{}/{}", ready, desired),
        ready_replicas: ready,
        desired_replicas: desired,
        age: age_of(d.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        status: classify_replicas(counts),
    }
}

pub async fn list_deployments<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<DeploymentView>> {
    let items = fetch(cluster, scope).await?;
    Ok(items.iter().map(|d| deployment_view(d, now)).collect())
}

pub async fn deployment_status<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
) -> FetchResult<StatusTally> {
    let items = fetch(cluster, scope).await?;
    let mut tally = StatusTally::with_buckets(&REPLICA_BUCKETS);
    for d in &items {
        tally.record(Some(classify_replicas(replica_counts(d))));
    }
    Ok(super::log_tally("deployments", scope, tally))
}

pub fn deployment_description(d: &Deployment, now: DateTime<Utc>) -> WorkloadDescription {
    let spec = d.spec.as_ref();
    let status = d.status.as_ref();

    WorkloadDescription {
        meta: object_summary(&d.metadata, now),
        kind: "Deployment",
        selector: spec.map(|s| selector_labels(&s.selector)).unwrap_or_default(),
        strategy: spec
            .and_then(|s| s.strategy.as_ref())
            .and_then(|st| st.type_.clone()),
        replicas: ReplicaSummary {
            desired: spec.and_then(|s| s.replicas).unwrap_or(0),
            current: status.and_then(|s| s.replicas).unwrap_or(0),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            available: status.and_then(|s| s.available_replicas).unwrap_or(0),
            updated: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        },
        status: classify_replicas(replica_counts(d)),
        template: spec.map(|s| pod_template_view(&s.template)).unwrap_or_default(),
        volume_claims: Vec::new(),
    }
}

pub async fn describe_deployment<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<WorkloadDescription> {
    let d: Deployment = super::read(cluster, namespace, name).await?;
    Ok(deployment_description(&d, now))
}
