use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::StatefulSet;

use super::deployments::REPLICA_BUCKETS;
use super::describe::{object_summary, pod_template_view, selector_labels};
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{ReplicaSummary, StatefulSetView, WorkloadDescription};
use crate::status::{ReplicaCounts, StatusTally, classify_replicas};

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<StatefulSet>> {
    logged(
        "statefulsets",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )
}

fn replica_counts(sts: &StatefulSet) -> ReplicaCounts {
    sts.status
        .as_ref()
        .map(|s| ReplicaCounts {
            replicas: Some(s.replicas),
            ready: s.ready_replicas,
            available: s.available_replicas,
        })
        .unwrap_or_default()
}

pub fn statefulset_view(sts: &StatefulSet, now: DateTime<Utc>) -> StatefulSetView {
    let counts = replica_counts(sts);
    let desired = sts.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);

    StatefulSetView {
        namespace: namespace_of(&sts.metadata),
        name: name_of(&sts.metadata),
        ready: format!("{}/{}", counts.available.unwrap_or(0), desired),
        age: age_of(sts.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        status: classify_replicas(counts),
    }
}

pub async fn list_statefulsets<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<StatefulSetView>> {
    let items = fetch(cluster, scope).await?;
    Ok(items.iter().map(|s| statefulset_view(s, now)).collect())
}

pub async fn statefulset_status<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
) -> FetchResult<StatusTally> {
    let items = fetch(cluster, scope).await?;
    let mut tally = StatusTally::with_buckets(&REPLICA_BUCKETS);
    for sts in &items {
        tally.record(Some(classify_replicas(replica_counts(sts))));
    }
    Ok(super::log_tally("statefulsets", scope, tally))
}

pub fn statefulset_description(sts: &StatefulSet, now: DateTime<Utc>) -> WorkloadDescription {
    let spec = sts.spec.as_ref();
    let status = sts.status.as_ref();

    WorkloadDescription {
        meta: object_summary(&sts.metadata, now),
        kind: "StatefulSet",
        selector: spec.map(|s| selector_labels(&s.selector)).unwrap_or_default(),
        strategy: spec
            .and_then(|s| s.update_strategy.as_ref())
            .and_then(|u| u.type_.clone()),
        replicas: ReplicaSummary {
            desired: spec.and_then(|s| s.replicas).unwrap_or(0),
            current: status.and_then(|s| s.current_replicas).unwrap_or(0),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            available: status.and_then(|s| s.available_replicas).unwrap_or(0),
            updated: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        },
        status: classify_replicas(replica_counts(sts)),
        template: spec.map(|s| pod_template_view(&s.template)).unwrap_or_default(),
        volume_claims: spec
            .and_then(|s| s.volume_claim_templates.as_ref())
            .map(|claims| claims.iter().map(|c| name_of(&c.metadata)).collect())
            .unwrap_or_default(),
    }
}

pub async fn describe_statefulset<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<WorkloadDescription> {
    let sts: StatefulSet = super::read(cluster, namespace, name).await?;
    Ok(statefulset_description(&sts, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::status::StatusLabel;
    use crate::summary::describe::tests::template;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::apps::v1::{StatefulSetSpec, StatefulSetStatus};
    use k8s_openapi::api::core::v1::PersistentVolumeClaim;

    fn statefulset(name: &str, replicas: i32, ready: Option<i32>, available: Option<i32>) -> StatefulSet {
        StatefulSet {
            metadata: meta("data", name, Duration::days(40)),
            spec: Some(StatefulSetSpec {
                replicas: Some(replicas),
                service_name: name.to_string(),
                template: template(name),
                ..Default::default()
            }),
            status: Some(StatefulSetStatus {
                replicas,
                ready_replicas: ready,
                available_replicas: available,
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_statefulset_tally() {
        let cluster = FakeCluster::new().with(vec![
            statefulset("postgres", 3, Some(3), Some(3)),
            statefulset("redis", 3, Some(3), Some(2)),
            statefulset("kafka", 3, Some(3), None),
        ]);

        let tally = statefulset_status(&cluster, &Scope::All).await.unwrap();
        assert_eq!(
            serde_json::to_value(&tally).unwrap(),
            serde_json::json!({"Running": 1, "Pending": 2, "Count": 3})
        );
    }

    #[tokio::test]
    async fn test_statefulset_rows() {
        let cluster = FakeCluster::new().with(vec![statefulset("redis", 3, Some(3), Some(2))]);
        let rows = list_statefulsets(&cluster, &Scope::Namespace("data".to_string()), now())
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ready, "2/3");
        assert_eq!(rows[0].age, "1mo");
        assert_eq!(rows[0].status, StatusLabel::Pending);
    }

    #[tokio::test]
    async fn test_describe_statefulset() {
        let mut sts = statefulset("postgres", 3, Some(3), Some(3));
        if let Some(spec) = sts.spec.as_mut() {
            spec.volume_claim_templates = Some(vec![PersistentVolumeClaim {
                metadata: meta("", "pgdata", Duration::zero()),
                ..Default::default()
            }]);
        }
        let cluster = FakeCluster::new().with(vec![sts]);

        let d = describe_statefulset(&cluster, "data", "postgres", now()).await.unwrap();
        assert_eq!(d.kind, "StatefulSet");
        assert_eq!(d.replicas.desired, 3);
        assert_eq!(d.status, StatusLabel::Running);
        assert_eq!(d.volume_claims, vec!["pgdata".to_string()]);
        assert_eq!(d.template.containers[0].name, "postgres");

        let missing = describe_statefulset(&cluster, "data", "mysql", now()).await;
        assert!(matches!(missing, Err(crate::error::FetchError::Api { code: 404, .. })));
    }
}
