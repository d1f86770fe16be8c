use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::core::v1::Pod;

use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{ConditionView, ContainerView, NameCount, PodDetailView, PodView};
use crate::status::{StatusLabel, StatusTally, classify_pod};

const POD_BUCKETS: [StatusLabel; 4] = [
    StatusLabel::Pending,
    StatusLabel::Running,
    StatusLabel::Failed,
    StatusLabel::Succeeded,
];

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<Pod>> {
    logged("pods", scope, cluster.list(scope, &ListOptions::default()).await)
}

pub fn pod_view(pod: &Pod, now: DateTime<Utc>) -> PodView {
    let spec = pod.spec.as_ref();
    let status = pod.status.as_ref();

    // Ready-over-total shows the spec container count on both sides.
    let total = spec.map(|s| s.containers.len()).unwrap_or(0);

    PodView {
        namespace: namespace_of(&pod.metadata),
        name: name_of(&pod.metadata),
        containers: format!("{}/{}", total, total),
        node: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
        ip: status
            .and_then(|s| s.pod_ip.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        restarts: status
            .and_then(|s| s.container_statuses.as_ref())
            .map(|cs| cs.iter().map(|c| c.restart_count).sum::<i32>())
            .unwrap_or(0),
        age: age_of(pod.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        status: status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

pub async fn list_pods<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<PodView>> {
    let pods = fetch(cluster, scope).await?;
    Ok(pods.iter().map(|p| pod_view(p, now)).collect())
}

pub async fn pod_names<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<NameCount> {
    let pods = fetch(cluster, scope).await?;
    Ok(NameCount::new(
        pods.iter().map(|p| name_of(&p.metadata)).collect(),
    ))
}

pub fn tally_pods(pods: &[Pod]) -> StatusTally {
    let mut tally = StatusTally::with_buckets(&POD_BUCKETS);
    for pod in pods {
        tally.record(classify_pod(pod));
    }
    tally
}

pub async fn pod_status<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<StatusTally> {
    let pods = fetch(cluster, scope).await?;
    Ok(super::log_tally("pods", scope, tally_pods(&pods)))
}

pub fn pod_detail_view(pod: &Pod) -> PodDetailView {
    let spec = pod.spec.as_ref();
    let status = pod.status.as_ref();

    PodDetailView {
        name: name_of(&pod.metadata),
        namespace: namespace_of(&pod.metadata),
        status: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
        node_name: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
        pod_ip: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
        host_ip: status.and_then(|s| s.host_ip.clone()).unwrap_or_default(),
        start_time: status
            .and_then(|s| s.start_time.as_ref())
            .map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true)),
        containers: spec
            .map(|s| {
                s.containers
                    .iter()
                    .map(|c| ContainerView {
                        name: c.name.clone(),
                        image: c.image.clone().unwrap_or_default(),
                        ports: c
                            .ports
                            .iter()
                            .flatten()
                            .map(|p| p.container_port)
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        conditions: status
            .and_then(|s| s.conditions.as_ref())
            .map(|conds| {
                conds
                    .iter()
                    .map(|c| ConditionView {
                        condition_type: c.type_.clone(),
                        status: c.status.clone(),
                        reason: c.reason.clone().unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

pub async fn pod_detail<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
) -> FetchResult<PodDetailView> {
    let pod: Pod = super::read(cluster, namespace, name).await?;
    Ok(pod_detail_view(&pod))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::error::FetchError;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::core::v1::{
        Container, ContainerPort, ContainerState, ContainerStateRunning,
        ContainerStateTerminated, ContainerStatus, PodSpec, PodStatus,
    };

    fn container_status(restarts: i32, running: bool) -> ContainerStatus {
        ContainerStatus {
            name: "c".to_string(),
            restart_count: restarts,
            state: Some(if running {
                ContainerState {
                    running: Some(ContainerStateRunning::default()),
                    ..Default::default()
                }
            } else {
                ContainerState {
                    terminated: Some(ContainerStateTerminated {
                        exit_code: 1,
                        ..Default::default()
                    }),
                    ..Default::default()
                }
            }),
            ..Default::default()
        }
    }

    fn pod(ns: &str, name: &str, phase: &str, statuses: Vec<ContainerStatus>) -> Pod {
        let containers = (0..statuses.len().max(1))
            .map(|i| Container {
                name: format!("c{}", i),
                image: Some("nginx:1.27".to_string()),
                ports: Some(vec![ContainerPort {
                    container_port: 8080,
                    ..Default::default()
                }]),
                ..Default::default()
            })
            .collect();
        Pod {
            metadata: meta(ns, name, Duration::hours(2)),
            spec: Some(PodSpec {
                containers,
                node_name: Some("worker-1".to_string()),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                container_statuses: Some(statuses),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_pod_view_fields() {
        let p = pod(
            "default",
            "web-1",
            "Running",
            vec![container_status(2, true), container_status(3, true)],
        );
        let v = pod_view(&p, now());

        assert_eq!(v.containers, "2/2");
        assert_eq!(v.restarts, 5);
        assert_eq!(v.ip, "N/A");
        assert_eq!(v.node, "worker-1");
        assert_eq!(v.age, "2h");
        assert_eq!(v.status, "Running");
    }

    #[tokio::test]
    async fn test_pod_status_tally() {
        let cluster = FakeCluster::new().with(vec![
            pod("a", "ok", "Running", vec![container_status(0, true)]),
            pod(
                "a",
                "crashing",
                "Running",
                vec![container_status(0, true), container_status(7, false)],
            ),
            pod("b", "waiting", "Pending", vec![]),
            pod("b", "done", "Succeeded", vec![]),
        ]);

        let tally = pod_status(&cluster, &Scope::All).await.unwrap();
        assert_eq!(tally.get(StatusLabel::Running), 1);
        assert_eq!(tally.get(StatusLabel::Failed), 1);
        assert_eq!(tally.get(StatusLabel::Pending), 1);
        assert_eq!(tally.get(StatusLabel::Succeeded), 1);
        assert_eq!(tally.count(), 4);

        let scoped = pod_status(&cluster, &Scope::Namespace("b".to_string()))
            .await
            .unwrap();
        assert_eq!(scoped.count(), 2);
        assert_eq!(scoped.get(StatusLabel::Running), 0);
    }

    #[tokio::test]
    async fn test_pod_names_and_errors() {
        let cluster = FakeCluster::new().with(vec![
            pod("a", "one", "Running", vec![]),
            pod("b", "two", "Pending", vec![]),
        ]);
        let names = pod_names(&cluster, &Scope::All).await.unwrap();
        assert_eq!(names.count, 2);
        assert_eq!(names.names, vec!["one".to_string(), "two".to_string()]);

        let down = FakeCluster::failing(FetchError::Transport("connection refused".to_string()));
        assert!(matches!(
            list_pods(&down, &Scope::All, now()).await,
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_pod_detail() {
        let cluster = FakeCluster::new().with(vec![pod(
            "default",
            "web-1",
            "Running",
            vec![container_status(0, true)],
        )]);

        let d = pod_detail(&cluster, "default", "web-1").await.unwrap();
        assert_eq!(d.node_name, "worker-1");
        assert_eq!(d.containers.len(), 1);
        assert_eq!(d.containers[0].image, "nginx:1.27");
        assert_eq!(d.containers[0].ports, vec![8080]);

        let missing = pod_detail(&cluster, "default", "nope").await;
        assert!(matches!(missing, Err(FetchError::Api { code: 404, .. })));
    }
}
