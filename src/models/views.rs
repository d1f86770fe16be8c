use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FetchError;
use crate::status::{StatusLabel, StatusTally};

// Flattened, per-request snapshots of cluster objects. Nothing here is kept
// between requests.

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NameCount {
    pub names: Vec<String>,
    pub count: usize,
}

impl NameCount {
    pub fn new(names: Vec<String>) -> Self {
        let count = names.len();
        Self { names, count }
    }
}

/// Detail rows plus how many there are.
#[derive(Debug, Clone, Serialize)]
pub struct Counted<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Counted<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceView {
    pub name: String,
    pub status: String,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PodView {
    pub namespace: String,
    pub name: String,
    /// `"N/N"` from the spec's container count.
    pub containers: String,
    pub node: String,
    pub ip: String,
    pub restarts: i32,
    pub age: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PodDetailView {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub node_name: String,
    pub pod_ip: String,
    pub host_ip: String,
    pub start_time: Option<String>,
    pub containers: Vec<ContainerView>,
    pub conditions: Vec<ConditionView>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerView {
    pub name: String,
    pub image: String,
    pub ports: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConditionView {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentView {
    pub namespace: String,
    pub name: String,
    /// `"ready/desired"`.
    pub ready: String,
    pub ready_replicas: i32,
    pub desired_replicas: i32,
    pub age: String,
    pub status: StatusLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplicaSetView {
    pub namespace: String,
    pub name: String,
    pub desired: i32,
    pub current: i32,
    pub ready: i32,
    pub age: String,
    pub images: Vec<String>,
    pub status: StatusLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatefulSetView {
    pub namespace: String,
    pub name: String,
    /// `"available/desired"`.
    pub ready: String,
    pub age: String,
    pub status: StatusLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaemonSetView {
    pub namespace: String,
    pub name: String,
    pub desired: i32,
    pub current: i32,
    pub ready: i32,
    pub available: i32,
    pub age: String,
    pub status: StatusLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub namespace: String,
    pub name: String,
    pub status: StatusLabel,
    /// `"succeeded/completions"`.
    pub completions: String,
    /// Start to completion, or the job's age while it has not finished.
    pub duration: String,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CronJobView {
    pub namespace: String,
    pub name: String,
    pub schedule: String,
    pub time_zone: Option<String>,
    pub suspend: bool,
    pub active: usize,
    pub last_schedule: String,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeView {
    pub name: String,
    pub status: String,
    pub roles: String,
    pub version: String,
    pub internal_ip: String,
    pub external_ip: String,
    pub os_image: String,
    pub kernel_version: String,
    pub container_runtime: String,
    pub memory: String,
    pub age: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct NodeStatusCounts {
    pub ready_nodes: usize,
    pub not_ready_nodes: usize,
    pub node_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceView {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: String,
    pub external_ip: String,
    pub ports: String,
    pub selector: BTreeMap<String, String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointView {
    pub namespace: String,
    pub name: String,
    pub endpoints: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigMapView {
    pub namespace: String,
    pub name: String,
    pub keys: usize,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecretView {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "type")]
    pub secret_type: String,
    /// Every key maps to `"REDACTED"`.
    pub data: BTreeMap<String, String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventView {
    pub namespace: String,
    pub message: String,
    pub object: String,
    pub source: String,
    pub count: Option<i32>,
    pub last_seen: String,
    #[serde(rename = "type")]
    pub event_type: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceAccountView {
    pub namespace: String,
    pub name: String,
    pub secrets: Vec<String>,
    pub age: String,
}

// Single-object descriptions.

/// Metadata shared by every description.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// Without the kubectl last-applied annotation.
    pub annotations: BTreeMap<String, String>,
    pub created: Option<String>,
    pub age: String,
    /// First owner reference as `Kind/name`.
    pub controlled_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateContainerView {
    pub name: String,
    pub image: String,
    pub ports: Vec<i32>,
    /// Variable names only.
    pub env: Vec<String>,
    pub mounts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeView {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PodTemplateView {
    pub labels: BTreeMap<String, String>,
    pub containers: Vec<TemplateContainerView>,
    pub volumes: Vec<VolumeView>,
    pub node_selector: BTreeMap<String, String>,
    /// `key=value:effect`, `key:effect` for `Exists`.
    pub tolerations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReplicaSummary {
    pub desired: i32,
    pub current: i32,
    pub ready: i32,
    pub available: i32,
    pub updated: i32,
}

/// Description of a Deployment, ReplicaSet, StatefulSet or DaemonSet.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadDescription {
    #[serde(flatten)]
    pub meta: ObjectSummary,
    pub kind: &'static str,
    pub selector: BTreeMap<String, String>,
    pub strategy: Option<String>,
    pub replicas: ReplicaSummary,
    pub status: StatusLabel,
    pub template: PodTemplateView,
    /// StatefulSet volume claim template names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_claims: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServicePortView {
    pub name: String,
    pub protocol: String,
    pub port: i32,
    pub target_port: String,
    pub node_port: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointSubsetView {
    pub addresses: Vec<String>,
    /// `port/protocol`.
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceDescription {
    #[serde(flatten)]
    pub meta: ObjectSummary,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: String,
    pub ports: Vec<ServicePortView>,
    pub selector: BTreeMap<String, String>,
    pub load_balancer_ip: String,
    pub external_ips: Vec<String>,
    pub ip_family_policy: Option<String>,
    pub ip_families: Vec<String>,
    pub session_affinity: Option<String>,
    pub internal_traffic_policy: Option<String>,
    /// Empty when the service has no Endpoints object.
    pub endpoints: Vec<EndpointSubsetView>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceAccountDescription {
    #[serde(flatten)]
    pub meta: ObjectSummary,
    pub secrets: Vec<String>,
    pub image_pull_secrets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigMapDescription {
    #[serde(flatten)]
    pub meta: ObjectSummary,
    pub data: BTreeMap<String, String>,
    pub binary_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SecretDescription {
    #[serde(flatten)]
    pub meta: ObjectSummary,
    #[serde(rename = "type")]
    pub secret_type: String,
    /// Every key maps to `"REDACTED"`.
    pub data: BTreeMap<String, String>,
}

// Access control, networking and quota listings.

/// A Role, or a ClusterRole with an empty namespace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleView {
    pub namespace: String,
    pub name: String,
    pub rules: usize,
    pub age: String,
}

/// A RoleBinding, or a ClusterRoleBinding with an empty namespace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleBindingView {
    pub namespace: String,
    pub name: String,
    /// `Kind/name` of the bound role.
    pub role: String,
    pub users: Vec<String>,
    pub groups: Vec<String>,
    /// `namespace/name`.
    pub service_accounts: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngressView {
    pub namespace: String,
    pub name: String,
    pub class: String,
    pub hosts: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkPolicyView {
    pub namespace: String,
    pub name: String,
    /// `k=v, k=v`, or `"None"` when the policy selects every pod.
    pub pod_selector: String,
    pub policy_types: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceQuotaView {
    pub namespace: String,
    pub name: String,
    pub requests_cpu: String,
    pub limits_cpu: String,
    pub hard: BTreeMap<String, String>,
    pub used: BTreeMap<String, String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LimitRangeView {
    pub namespace: String,
    pub name: String,
    pub types: Vec<String>,
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PodDisruptionBudgetView {
    pub namespace: String,
    pub name: String,
    pub min_available: String,
    pub max_unavailable: String,
    pub disruptions_allowed: i32,
    pub age: String,
}

/// One dashboard section that either loaded or failed on its own.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Section<T> {
    Ok { data: T },
    Error { error: String, message: String },
}

impl<T> From<Result<T, FetchError>> for Section<T> {
    fn from(r: Result<T, FetchError>) -> Self {
        match r {
            Ok(data) => Section::Ok { data },
            Err(e) => Section::Error {
                error: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterOverview {
    pub cluster: String,
    pub scope: String,
    pub nodes: Section<NodeStatusCounts>,
    pub pods: Section<StatusTally>,
    pub deployments: Section<StatusTally>,
    pub replicasets: Section<StatusTally>,
    pub statefulsets: Section<StatusTally>,
    pub daemonsets: Section<StatusTally>,
    pub jobs: Section<StatusTally>,
    pub cronjobs: Section<StatusTally>,
    pub events: Section<Vec<EventView>>,
    pub namespaces: Section<NameCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum ComponentStatus {
    Running,
    Unhealthy,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterHealth {
    pub name: String,
    pub context: String,
    pub reachable: bool,
    pub server_version: Option<String>,
    pub number_of_nodes: Option<usize>,
    pub control_plane_status: ComponentStatus,
    pub core_dns_status: ComponentStatus,
    pub failed_control_pods: Vec<String>,
    pub failed_dns_pods: Vec<String>,
    pub error: Option<String>,
    pub last_probe: Option<DateTime<Utc>>,
    /// Compact age of `last_probe` at the time the health list was rendered.
    pub last_probe_age: Option<String>,
}

impl ClusterHealth {
    pub fn unprobed(name: &str, context: &str) -> Self {
        Self {
            name: name.to_string(),
            context: context.to_string(),
            reachable: false,
            server_version: None,
            number_of_nodes: None,
            control_plane_status: ComponentStatus::Unavailable,
            core_dns_status: ComponentStatus::Unavailable,
            failed_control_pods: Vec::new(),
            failed_dns_pods: Vec::new(),
            error: None,
            last_probe: None,
            last_probe_age: None,
        }
    }
}
