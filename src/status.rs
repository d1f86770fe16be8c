//! Coarse status buckets for workloads and nodes.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Node, Pod};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StatusLabel {
    Running,
    Pending,
    Failed,
    Succeeded,
    Completed,
}

/// Desired/ready/available replica counts as reported by a Deployment or
/// ReplicaSet status. `None` means the API left the field out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicaCounts {
    pub replicas: Option<i32>,
    pub ready: Option<i32>,
    pub available: Option<i32>,
}

/// `Running` only when all three counts are present and equal.
pub fn classify_replicas(counts: ReplicaCounts) -> StatusLabel {
    match (counts.replicas, counts.ready, counts.available) {
        (Some(r), Some(ready), Some(avail)) if r == ready && ready == avail => StatusLabel::Running,
        _ => StatusLabel::Pending,
    }
}

/// Pod bucket. A pod in phase `Failed` counts as `Failed`, unlike older
/// dashboards that left such pods out of every bucket. A pod in phase
/// `Running` with any container not in the running state also counts as
/// `Failed`. Pods in other phases (`Unknown`, or none reported) land in no
/// bucket.
pub fn classify_pod(pod: &Pod) -> Option<StatusLabel> {
    let status = pod.status.as_ref()?;
    match status.phase.as_deref()? {
        "Succeeded" => Some(StatusLabel::Succeeded),
        "Pending" => Some(StatusLabel::Pending),
        "Failed" => Some(StatusLabel::Failed),
        "Running" => {
            let all_running = status
                .container_statuses
                .iter()
                .flatten()
                .all(|cs| cs.state.as_ref().is_some_and(|s| s.running.is_some()));
            if all_running {
                Some(StatusLabel::Running)
            } else {
                Some(StatusLabel::Failed)
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeReadiness {
    Ready,
    NotReady,
}

/// Looks only at the condition of type `Ready`; a node without one is not ready.
pub fn classify_node(node: &Node) -> NodeReadiness {
    let ready = node
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conds| conds.iter().find(|c| c.type_ == "Ready"))
        .is_some_and(|c| c.status == "True");
    if ready {
        NodeReadiness::Ready
    } else {
        NodeReadiness::NotReady
    }
}

/// Per-label counts plus a `Count` of every object folded in, labelled or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    #[serde(flatten)]
    buckets: BTreeMap<StatusLabel, usize>,
    #[serde(rename = "Count")]
    count: usize,
}

impl StatusTally {
    /// A tally with every given bucket present at zero.
    pub fn with_buckets(labels: &[StatusLabel]) -> Self {
        Self {
            buckets: labels.iter().map(|l| (*l, 0)).collect(),
            count: 0,
        }
    }

    pub fn record(&mut self, label: Option<StatusLabel>) {
        self.count += 1;
        if let Some(label) = label {
            *self.buckets.entry(label).or_insert(0) += 1;
        }
    }

    pub fn get(&self, label: StatusLabel) -> usize {
        self.buckets.get(&label).copied().unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
