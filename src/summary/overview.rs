use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    cronjobs, daemonsets, deployments, events, jobs, namespaces, nodes, pods, replicasets,
    statefulsets,
};
use crate::clients::ClusterApi;
use crate::models::k8s::Scope;
use crate::models::views::{ClusterOverview, Section};

/// Every dashboard section for one cluster, fetched concurrently. A failing
/// section is reported in place and does not hide the others.
pub async fn overview<C: ClusterApi>(
    cluster: &C,
    cluster_name: &str,
    scope: &Scope,
    event_limit: u32,
    now: DateTime<Utc>,
) -> ClusterOverview {
    let (
        node_counts,
        pod_tally,
        deploy_tally,
        rs_tally,
        sts_tally,
        ds_tally,
        job_tally,
        cj_tally,
        recent,
        ns_names,
    ) = tokio::join!(
        nodes::node_status(cluster),
        pods::pod_status(cluster, scope),
        deployments::deployment_status(cluster, scope),
        replicasets::replicaset_status(cluster, scope),
        statefulsets::statefulset_status(cluster, scope),
        daemonsets::daemonset_status(cluster, scope),
        jobs::job_status(cluster, scope),
        cronjobs::cronjob_status(cluster, scope),
        events::list_events(cluster, scope, Some(event_limit), now),
        namespaces::namespace_names(cluster),
    );

    let out = ClusterOverview {
        cluster: cluster_name.to_string(),
        scope: scope.to_string(),
        nodes: Section::from(node_counts),
        pods: Section::from(pod_tally),
        deployments: Section::from(deploy_tally),
        replicasets: Section::from(rs_tally),
        statefulsets: Section::from(sts_tally),
        daemonsets: Section::from(ds_tally),
        jobs: Section::from(job_tally),
        cronjobs: Section::from(cj_tally),
        events: Section::from(recent),
        namespaces: Section::from(ns_names),
    };
    debug!("built overview for {} in {}", cluster_name, scope);
    out
}
