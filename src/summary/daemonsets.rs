use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::DaemonSet;

use super::deployments::REPLICA_BUCKETS;
use super::describe::{object_summary, pod_template_view, selector_labels};
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{DaemonSetView, ReplicaSummary, WorkloadDescription};
use crate::status::{ReplicaCounts, StatusTally, classify_replicas};

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<DaemonSet>> {
    logged(
        "daemonsets",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )
}

/// Desired, ready and currently scheduled pods; `Running` when all three agree.
fn replica_counts(ds: &DaemonSet) -> ReplicaCounts {
    ds.status
        .as_ref()
        .map(|s| ReplicaCounts {
            replicas: Some(s.desired_number_scheduled),
            ready: Some(s.number_ready),
            available: Some(s.current_number_scheduled),
        })
        .unwrap_or_default()
}

pub fn daemonset_view(ds: &DaemonSet, now: DateTime<Utc>) -> DaemonSetView {
    let status = ds.status.as_ref();

    DaemonSetView {
        namespace: namespace_of(&ds.metadata),
        name: name_of(&ds.metadata),
        desired: status.map(|s| s.desired_number_scheduled).unwrap_or(0),
        current: status.map(|s| s.current_number_scheduled).unwrap_or(0),
        ready: status.map(|s| s.number_ready).unwrap_or(0),
        available: status.and_then(|s| s.number_available).unwrap_or(0),
        age: age_of(ds.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        status: classify_replicas(replica_counts(ds)),
    }
}

pub async fn list_daemonsets<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<DaemonSetView>> {
    let items = fetch(cluster, scope).await?;
    Ok(items.iter().map(|d| daemonset_view(d, now)).collect())
}

pub async fn daemonset_status<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
) -> FetchResult<StatusTally> {
    let items = fetch(cluster, scope).await?;
    let mut tally = StatusTally::with_buckets(&REPLICA_BUCKETS);
    for ds in &items {
        tally.record(Some(classify_replicas(replica_counts(ds))));
    }
    Ok(super::log_tally("daemonsets", scope, tally))
}

pub fn daemonset_description(ds: &DaemonSet, now: DateTime<Utc>) -> WorkloadDescription {
    let spec = ds.spec.as_ref();
    let view = daemonset_view(ds, now);

    WorkloadDescription {
        meta: object_summary(&ds.metadata, now),
        kind: "DaemonSet",
        selector: spec.map(|s| selector_labels(&s.selector)).unwrap_or_default(),
        strategy: spec
            .and_then(|s| s.update_strategy.as_ref())
            .and_then(|u| u.type_.clone()),
        replicas: ReplicaSummary {
            desired: view.desired,
            current: view.current,
            ready: view.ready,
            available: view.available,
            updated: ds
                .status
                .as_ref()
                .and_then(|s| s.updated_number_scheduled)
                .unwrap_or(0),
        },
        status: view.status,
        template: spec.map(|s| pod_template_view(&s.template)).unwrap_or_default(),
        volume_claims: Vec::new(),
    }
}

pub async fn describe_daemonset<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<WorkloadDescription> {
    let ds: DaemonSet = super::read(cluster, namespace, name).await?;
    Ok(daemonset_description(&ds, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::status::StatusLabel;
    use crate::summary::describe::tests::template;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::apps::v1::{DaemonSetSpec, DaemonSetStatus, DaemonSetUpdateStrategy};

    fn daemonset(name: &str, desired: i32, current: i32, ready: i32) -> DaemonSet {
        DaemonSet {
            metadata: meta("kube-system", name, Duration::days(7)),
            spec: Some(DaemonSetSpec {
                template: template(name),
                update_strategy: Some(DaemonSetUpdateStrategy {
                    type_: Some("RollingUpdate".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            status: Some(DaemonSetStatus {
                desired_number_scheduled: desired,
                current_number_scheduled: current,
                number_ready: ready,
                number_available: Some(ready),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_daemonset_tally() {
        let mut bare = daemonset("new", 0, 0, 0);
        bare.status = None;
        let cluster = FakeCluster::new().with(vec![
            daemonset("kube-proxy", 3, 3, 3),
            daemonset("fluent-bit", 3, 3, 2),
            daemonset("node-exporter", 3, 2, 2),
            bare,
        ]);

        let tally = daemonset_status(&cluster, &Scope::All).await.unwrap();
        assert_eq!(
            serde_json::to_value(&tally).unwrap(),
            serde_json::json!({"Running": 1, "Pending": 3, "Count": 4})
        );
    }

    #[tokio::test]
    async fn test_daemonset_rows_and_description() {
        let cluster = FakeCluster::new().with(vec![daemonset("fluent-bit", 3, 3, 2)]);

        let rows = list_daemonsets(&cluster, &Scope::All, now()).await.unwrap();
        assert_eq!(rows[0].desired, 3);
        assert_eq!(rows[0].ready, 2);
        assert_eq!(rows[0].age, "7d");
        assert_eq!(rows[0].status, StatusLabel::Pending);

        let d = describe_daemonset(&cluster, "kube-system", "fluent-bit", now())
            .await
            .unwrap();
        assert_eq!(d.kind, "DaemonSet");
        assert_eq!(d.strategy.as_deref(), Some("RollingUpdate"));
        assert_eq!(d.replicas.available, 2);
        assert!(d.volume_claims.is_empty());
    }
}
