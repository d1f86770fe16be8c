use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::ReplicaSet;

use super::deployments::REPLICA_BUCKETS;
use super::describe::{object_summary, pod_template_view, selector_labels};
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{ReplicaSetView, ReplicaSummary, WorkloadDescription};
use crate::status::{ReplicaCounts, StatusTally, classify_replicas};

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<ReplicaSet>> {
    logged(
        "replicasets",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )
}

fn replica_counts(rs: &ReplicaSet) -> ReplicaCounts {
    rs.status
        .as_ref()
        .map(|s| ReplicaCounts {
            replicas: Some(s.replicas),
            ready: s.ready_replicas,
            available: s.available_replicas,
        })
        .unwrap_or_default()
}

pub fn replicaset_view(rs: &ReplicaSet, now: DateTime<Utc>) -> ReplicaSetView {
    let counts = replica_counts(rs);
    let spec = rs.spec.as_ref();

    ReplicaSetView {
        namespace: namespace_of(&rs.metadata),
        name: name_of(&rs.metadata),
        desired: spec.and_then(|s| s.replicas).unwrap_or(0),
        current: counts.replicas.unwrap_or(0),
        ready: counts.ready.unwrap_or(0),
        age: age_of(rs.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        images: spec
            .and_then(|s| s.template.as_ref())
            .and_then(|t| t.spec.as_ref())
            .map(|ps| ps.containers.iter().filter_map(|c| c.image.clone()).collect())
            .unwrap_or_default(),
        status: classify_replicas(counts),
    }
}

pub async fn list_replicasets<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<ReplicaSetView>> {
    let items = fetch(cluster, scope).await?;
    Ok(items.iter().map(|rs| replicaset_view(rs, now)).collect())
}

pub async fn replicaset_status<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
) -> FetchResult<StatusTally> {
    let items = fetch(cluster, scope).await?;
    let mut tally = StatusTally::with_buckets(&REPLICA_BUCKETS);
    for rs in &items {
        tally.record(Some(classify_replicas(replica_counts(rs))));
    }
    Ok(super::log_tally("replicasets", scope, tally))
}

pub fn replicaset_description(rs: &ReplicaSet, now: DateTime<Utc>) -> WorkloadDescription {
    let spec = rs.spec.as_ref();
    let counts = replica_counts(rs);

    WorkloadDescription {
        meta: object_summary(&rs.metadata, now),
        kind: "ReplicaSet",
        selector: spec.map(|s| selector_labels(&s.selector)).unwrap_or_default(),
        strategy: None,
        replicas: ReplicaSummary {
            desired: spec.and_then(|s| s.replicas).unwrap_or(0),
            current: counts.replicas.unwrap_or(0),
            ready: counts.ready.unwrap_or(0),
            available: counts.available.unwrap_or(0),
            updated: 0,
        },
        status: classify_replicas(counts),
        template: spec
            .and_then(|s| s.template.as_ref())
            .map(pod_template_view)
            .unwrap_or_default(),
        volume_claims: Vec::new(),
    }
}

pub async fn describe_replicaset<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<WorkloadDescription> {
    let rs: ReplicaSet = super::read(cluster, namespace, name).await?;
    Ok(replicaset_description(&rs, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::error::FetchError;
    use crate::status::StatusLabel;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::apps::v1::{ReplicaSetSpec, ReplicaSetStatus};
    use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    fn replicaset(name: &str, replicas: i32, ready: Option<i32>, available: Option<i32>) -> ReplicaSet {
        ReplicaSet {
            metadata: meta("shop", name, Duration::minutes(30)),
            spec: Some(ReplicaSetSpec {
                replicas: Some(replicas),
                template: Some(PodTemplateSpec {
                    spec: Some(PodSpec {
                        containers: vec![
                            Container {
                                name: "app".to_string(),
                                image: Some("shop/api:2.1".to_string()),
                                ..Default::default()
                            },
                            Container {
                                name: "proxy".to_string(),
                                image: Some("envoy:1.31".to_string()),
                                ..Default::default()
                            },
                        ],
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            status: Some(ReplicaSetStatus {
                replicas,
                ready_replicas: ready,
                available_replicas: available,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_replicaset_view() {
        let v = replicaset_view(&replicaset("api-7d9f", 3, Some(2), Some(2)), now());
        assert_eq!(v.desired, 3);
        assert_eq!(v.current, 3);
        assert_eq!(v.ready, 2);
        assert_eq!(v.age, "30m");
        assert_eq!(v.images, vec!["shop/api:2.1".to_string(), "envoy:1.31".to_string()]);
        assert_eq!(v.status, StatusLabel::Pending);
    }

    #[tokio::test]
    async fn test_describe_replicaset() {
        let mut rs = replicaset("api-7d9f", 2, Some(2), Some(2));
        rs.metadata.owner_references = Some(vec![OwnerReference {
            kind: "Deployment".to_string(),
            name: "api".to_string(),
            ..Default::default()
        }]);
        let cluster = FakeCluster::new().with(vec![rs]);

        let d = describe_replicaset(&cluster, "shop", "api-7d9f", now()).await.unwrap();
        assert_eq!(d.meta.controlled_by.as_deref(), Some("Deployment/api"));
        assert_eq!(d.replicas.current, 2);
        assert_eq!(d.status, StatusLabel::Running);
        assert_eq!(d.strategy, None);
        assert_eq!(d.template.containers.len(), 2);
        assert_eq!(d.template.containers[1].image, "envoy:1.31");
    }

    #[tokio::test]
    async fn test_scaled_down_replicaset_is_pending() {
        // An old ReplicaSet at zero replicas reports no ready/available counts.
        let cluster = FakeCluster::new().with(vec![
            replicaset("api-new", 2, Some(2), Some(2)),
            replicaset("api-old", 0, None, None),
        ]);

        let tally = replicaset_status(&cluster, &Scope::All).await.unwrap();
        assert_eq!(tally.get(StatusLabel::Running), 1);
        assert_eq!(tally.get(StatusLabel::Pending), 1);
        assert_eq!(tally.count(), 2);
    }

    #[tokio::test]
    async fn test_forbidden_listing_is_reported() {
        let cluster = FakeCluster::new().fail_kind::<ReplicaSet>(FetchError::Api {
            code: 403,
            reason: "Forbidden".to_string(),
            message: "replicasets.apps is forbidden".to_string(),
        });
        assert!(matches!(
            replicaset_status(&cluster, &Scope::All).await,
            Err(FetchError::Api { code: 403, .. })
        ));
    }
}
