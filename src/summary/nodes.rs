use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Node;

use super::name_of;
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of, human_bytes, quantity_bytes};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{NameCount, NodeStatusCounts, NodeView};
use crate::status::{NodeReadiness, classify_node};

const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";
const LEGACY_ROLE_LABEL: &str = "kubernetes.io/role";

async fn fetch<C: ClusterApi>(cluster: &C) -> FetchResult<Vec<Node>> {
    super::logged(
        "nodes",
        &Scope::All,
        cluster.list_cluster(&ListOptions::default()).await,
    )
}

fn roles(node: &Node) -> String {
    let Some(labels) = node.metadata.labels.as_ref() else {
        return "Unknown".to_string();
    };
    let roles: Vec<&str> = labels
        .keys()
        .filter_map(|k| k.strip_prefix(ROLE_LABEL_PREFIX))
        .filter(|r| !r.is_empty())
        .collect();
    if !roles.is_empty() {
        return roles.join(",");
    }
    labels
        .get(LEGACY_ROLE_LABEL)
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string())
}

fn address(node: &Node, kind: &str) -> String {
    node.status
        .as_ref()
        .and_then(|s| s.addresses.as_ref())
        .and_then(|addrs| addrs.iter().find(|a| a.type_ == kind))
        .map(|a| a.address.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn node_view(node: &Node, now: DateTime<Utc>) -> NodeView {
    let status = node.status.as_ref();
    let info = status.and_then(|s| s.node_info.as_ref());

    let memory = status
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("memory"))
        .map(|q| match quantity_bytes(&q.0) {
            Some(bytes) => human_bytes(bytes),
            None => q.0.clone(),
        })
        .unwrap_or_default();

    NodeView {
        name: name_of(&node.metadata),
        status: match classify_node(node) {
            NodeReadiness::Ready => "Ready".to_string(),
            NodeReadiness::NotReady => "NotReady".to_string(),
        },
        roles: roles(node),
        version: info.map(|i| i.kubelet_version.clone()).unwrap_or_default(),
        internal_ip: address(node, "InternalIP"),
        external_ip: address(node, "ExternalIP"),
        os_image: info.map(|i| i.os_image.clone()).unwrap_or_default(),
        kernel_version: info.map(|i| i.kernel_version.clone()).unwrap_or_default(),
        container_runtime: info
            .map(|i| i.container_runtime_version.clone())
            .unwrap_or_default(),
        memory,
        age: age_of(node.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_nodes<C: ClusterApi>(cluster: &C, now: DateTime<Utc>) -> FetchResult<Vec<NodeView>> {
    let nodes = fetch(cluster).await?;
    Ok(nodes.iter().map(|n| node_view(n, now)).collect())
}

pub async fn node_names<C: ClusterApi>(cluster: &C) -> FetchResult<NameCount> {
    let nodes = fetch(cluster).await?;
    Ok(NameCount::new(
        nodes.iter().map(|n| name_of(&n.metadata)).collect(),
    ))
}

pub fn count_nodes(nodes: &[Node]) -> NodeStatusCounts {
    let mut counts = NodeStatusCounts {
        node_count: nodes.len(),
        ..Default::default()
    };
    for node in nodes {
        match classify_node(node) {
            NodeReadiness::Ready => counts.ready_nodes += 1,
            NodeReadiness::NotReady => counts.not_ready_nodes += 1,
        }
    }
    counts
}

pub async fn node_status<C: ClusterApi>(cluster: &C) -> FetchResult<NodeStatusCounts> {
    let nodes = fetch(cluster).await?;
    Ok(count_nodes(&nodes))
}
