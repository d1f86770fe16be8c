use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service, ServiceAccount};
use serde::Deserialize;

use crate::AppState;
use crate::error::FetchError;
use crate::models::k8s::ScopeQuery;
use crate::models::views::*;
use crate::status::StatusTally;
use crate::summary::{
    access, config_data, cronjobs, daemonsets, deployments, events, jobs, namespaces, networking,
    nodes, overview, pods, quotas, replicasets, service_accounts, services, statefulsets, yaml,
};

type ApiResult<T> = Result<Json<T>, FetchError>;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

fn text(body: String) -> Response {
    ([("content-type", "text/plain; charset=utf-8")], body).into_response()
}

fn yaml_text(body: String) -> Response {
    ([("content-type", "application/yaml; charset=utf-8")], body).into_response()
}

/// `reason: message` lines for one object of `kind`.
async fn kind_events(
    state: &AppState,
    cluster: &str,
    namespace: &str,
    kind: &str,
    name: &str,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(cluster).await?;
    let lines = events::object_events(&client, namespace, Some(kind), name).await?;
    Ok(text(lines))
}

pub async fn handle_healthz() -> &'static str {
    "ok\n"
}

pub async fn handle_list_clusters(State(state): State<AppState>) -> Json<Vec<ClusterHealth>> {
    Json(state.registry.health().await)
}

pub async fn handle_overview(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<ClusterOverview> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        overview::overview(
            &client,
            &cluster,
            &q.scope(),
            state.config.event_limit,
            Utc::now(),
        )
        .await,
    ))
}

pub async fn handle_namespaces(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> ApiResult<Vec<NamespaceView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(namespaces::list_namespaces(&client, Utc::now()).await?))
}

// Nodes

pub async fn handle_nodes(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> ApiResult<Vec<NodeView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(nodes::list_nodes(&client, Utc::now()).await?))
}

pub async fn handle_node_names(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> ApiResult<NameCount> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(nodes::node_names(&client).await?))
}

pub async fn handle_node_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> ApiResult<NodeStatusCounts> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(nodes::node_status(&client).await?))
}

// Pods

pub async fn handle_pods(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<PodView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(pods::list_pods(&client, &q.scope(), Utc::now()).await?))
}

pub async fn handle_pod_names(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<NameCount> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(pods::pod_names(&client, &q.scope()).await?))
}

pub async fn handle_pod_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(pods::pod_status(&client, &q.scope()).await?))
}

pub async fn handle_pod_detail(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<PodDetailView> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(pods::pod_detail(&client, &namespace, &name).await?))
}

pub async fn handle_pod_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "Pod", &name).await
}

pub async fn handle_pod_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<Pod, _>(&client, &namespace, &name).await?,
    ))
}

// Deployments

pub async fn handle_deployments(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<DeploymentView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        deployments::list_deployments(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_deployment_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(deployments::deployment_status(&client, &q.scope()).await?))
}

pub async fn handle_deployment_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<WorkloadDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        deployments::describe_deployment(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_deployment_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "Deployment", &name).await
}

pub async fn handle_deployment_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<Deployment, _>(&client, &namespace, &name).await?,
    ))
}

// ReplicaSets

pub async fn handle_replicasets(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<ReplicaSetView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        replicasets::list_replicasets(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_replicaset_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(replicasets::replicaset_status(&client, &q.scope()).await?))
}

pub async fn handle_replicaset_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<WorkloadDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        replicasets::describe_replicaset(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_replicaset_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "ReplicaSet", &name).await
}

pub async fn handle_replicaset_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<ReplicaSet, _>(&client, &namespace, &name).await?,
    ))
}

// StatefulSets

pub async fn handle_statefulsets(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<StatefulSetView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        statefulsets::list_statefulsets(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_statefulset_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(statefulsets::statefulset_status(&client, &q.scope()).await?))
}

pub async fn handle_statefulset_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<WorkloadDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        statefulsets::describe_statefulset(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_statefulset_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "StatefulSet", &name).await
}

pub async fn handle_statefulset_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<StatefulSet, _>(&client, &namespace, &name).await?,
    ))
}

// DaemonSets

pub async fn handle_daemonsets(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<DaemonSetView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        daemonsets::list_daemonsets(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_daemonset_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(daemonsets::daemonset_status(&client, &q.scope()).await?))
}

pub async fn handle_daemonset_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<WorkloadDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        daemonsets::describe_daemonset(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_daemonset_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "DaemonSet", &name).await
}

pub async fn handle_daemonset_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<DaemonSet, _>(&client, &namespace, &name).await?,
    ))
}

// Jobs

pub async fn handle_jobs(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<JobView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        jobs::list_jobs(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(jobs::job_status(&client, &q.scope()).await?))
}

pub async fn handle_job_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "Job", &name).await
}

pub async fn handle_job_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<Job, _>(&client, &namespace, &name).await?,
    ))
}

// CronJobs

pub async fn handle_cronjobs(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<CronJobView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        cronjobs::list_cronjobs(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_cronjob_status(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<StatusTally> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(cronjobs::cronjob_status(&client, &q.scope()).await?))
}

// Networking

pub async fn handle_services(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<ServiceView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        services::list_services(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_service_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<ServiceDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        services::describe_service(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_service_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "Service", &name).await
}

pub async fn handle_service_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<Service, _>(&client, &namespace, &name).await?,
    ))
}

pub async fn handle_endpoints(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<EndpointView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        services::list_endpoints(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_ingresses(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<IngressView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        networking::list_ingresses(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_network_policies(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<NetworkPolicyView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        networking::list_network_policies(&client, &q.scope(), Utc::now()).await?,
    ))
}

// Config

pub async fn handle_configmaps(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Counted<ConfigMapView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        config_data::list_configmaps(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_secrets(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Counted<SecretView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        config_data::list_secrets(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_configmap_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<ConfigMapDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        config_data::describe_configmap(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_secret_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<SecretDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        config_data::describe_secret(&client, &namespace, &name, Utc::now()).await?,
    ))
}

// Events

pub async fn handle_events(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Vec<EventView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        events::list_events(&client, &q.scope(), limit.limit, Utc::now()).await?,
    ))
}

// Service accounts

pub async fn handle_service_accounts(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Counted<ServiceAccountView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        service_accounts::list_service_accounts(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_service_account_describe(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> ApiResult<ServiceAccountDescription> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        service_accounts::describe_service_account(&client, &namespace, &name, Utc::now()).await?,
    ))
}

pub async fn handle_service_account_events(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    kind_events(&state, &cluster, &namespace, "ServiceAccount", &name).await
}

pub async fn handle_service_account_yaml(
    State(state): State<AppState>,
    Path((cluster, namespace, name)): Path<(String, String, String)>,
) -> Result<Response, FetchError> {
    let client = state.registry.connect(&cluster).await?;
    Ok(yaml_text(
        yaml::object_yaml::<ServiceAccount, _>(&client, &namespace, &name).await?,
    ))
}

// Access control

pub async fn handle_roles(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<RoleView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        access::list_roles(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_role_bindings(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<RoleBindingView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        access::list_role_bindings(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_cluster_roles(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> ApiResult<Vec<RoleView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(access::list_cluster_roles(&client, Utc::now()).await?))
}

pub async fn handle_cluster_role_bindings(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
) -> ApiResult<Vec<RoleBindingView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(access::list_cluster_role_bindings(&client, Utc::now()).await?))
}

// Quotas and budgets

pub async fn handle_resource_quotas(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<ResourceQuotaView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        quotas::list_resource_quotas(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_limit_ranges(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<LimitRangeView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        quotas::list_limit_ranges(&client, &q.scope(), Utc::now()).await?,
    ))
}

pub async fn handle_pod_disruption_budgets(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Vec<PodDisruptionBudgetView>> {
    let client = state.registry.connect(&cluster).await?;
    Ok(Json(
        quotas::list_pod_disruption_budgets(&client, &q.scope(), Utc::now()).await?,
    ))
}
