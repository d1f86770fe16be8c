pub mod api;

use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let cluster = Router::new()
        .route("/overview", get(api::handle_overview))
        .route("/namespaces", get(api::handle_namespaces))
        // Nodes
        .route("/nodes", get(api::handle_nodes))
        .route("/nodes/names", get(api::handle_node_names))
        .route("/nodes/status", get(api::handle_node_status))
        // Pods
        .route("/pods", get(api::handle_pods))
        .route("/pods/names", get(api::handle_pod_names))
        .route("/pods/status", get(api::handle_pod_status))
        .route("/pods/{namespace}/{name}", get(api::handle_pod_detail))
        .route("/pods/{namespace}/{name}/events", get(api::handle_pod_events))
        .route("/pods/{namespace}/{name}/yaml", get(api::handle_pod_yaml))
        // Workloads
        .route("/deployments", get(api::handle_deployments))
        .route("/deployments/status", get(api::handle_deployment_status))
        .route(
            "/deployments/{namespace}/{name}",
            get(api::handle_deployment_describe),
        )
        .route(
            "/deployments/{namespace}/{name}/events",
            get(api::handle_deployment_events),
        )
        .route(
            "/deployments/{namespace}/{name}/yaml",
            get(api::handle_deployment_yaml),
        )
        .route("/replicasets", get(api::handle_replicasets))
        .route("/replicasets/status", get(api::handle_replicaset_status))
        .route(
            "/replicasets/{namespace}/{name}",
            get(api::handle_replicaset_describe),
        )
        .route(
            "/replicasets/{namespace}/{name}/events",
            get(api::handle_replicaset_events),
        )
        .route(
            "/replicasets/{namespace}/{name}/yaml",
            get(api::handle_replicaset_yaml),
        )
        .route("/statefulsets", get(api::handle_statefulsets))
        .route("/statefulsets/status", get(api::handle_statefulset_status))
        .route(
            "/statefulsets/{namespace}/{name}",
            get(api::handle_statefulset_describe),
        )
        .route(
            "/statefulsets/{namespace}/{name}/events",
            get(api::handle_statefulset_events),
        )
        .route(
            "/statefulsets/{namespace}/{name}/yaml",
            get(api::handle_statefulset_yaml),
        )
        .route("/daemonsets", get(api::handle_daemonsets))
        .route("/daemonsets/status", get(api::handle_daemonset_status))
        .route(
            "/daemonsets/{namespace}/{name}",
            get(api::handle_daemonset_describe),
        )
        .route(
            "/daemonsets/{namespace}/{name}/events",
            get(api::handle_daemonset_events),
        )
        .route(
            "/daemonsets/{namespace}/{name}/yaml",
            get(api::handle_daemonset_yaml),
        )
        .route("/jobs", get(api::handle_jobs))
        .route("/jobs/status", get(api::handle_job_status))
        .route("/jobs/{namespace}/{name}/events", get(api::handle_job_events))
        .route("/jobs/{namespace}/{name}/yaml", get(api::handle_job_yaml))
        .route("/cronjobs", get(api::handle_cronjobs))
        .route("/cronjobs/status", get(api::handle_cronjob_status))
        // Networking
        .route("/services", get(api::handle_services))
        .route("/services/{namespace}/{name}", get(api::handle_service_describe))
        .route(
            "/services/{namespace}/{name}/events",
            get(api::handle_service_events),
        )
        .route(
            "/services/{namespace}/{name}/yaml",
            get(api::handle_service_yaml),
        )
        .route("/endpoints", get(api::handle_endpoints))
        .route("/ingresses", get(api::handle_ingresses))
        .route("/networkpolicies", get(api::handle_network_policies))
        // Config and access
        .route("/configmaps", get(api::handle_configmaps))
        .route(
            "/configmaps/{namespace}/{name}",
            get(api::handle_configmap_describe),
        )
        .route("/secrets", get(api::handle_secrets))
        .route("/secrets/{namespace}/{name}", get(api::handle_secret_describe))
        .route("/events", get(api::handle_events))
        .route("/serviceaccounts", get(api::handle_service_accounts))
        .route(
            "/serviceaccounts/{namespace}/{name}",
            get(api::handle_service_account_describe),
        )
        .route(
            "/serviceaccounts/{namespace}/{name}/events",
            get(api::handle_service_account_events),
        )
        .route(
            "/serviceaccounts/{namespace}/{name}/yaml",
            get(api::handle_service_account_yaml),
        )
        .route("/roles", get(api::handle_roles))
        .route("/rolebindings", get(api::handle_role_bindings))
        .route("/clusterroles", get(api::handle_cluster_roles))
        .route("/clusterrolebindings", get(api::handle_cluster_role_bindings))
        // Quotas and budgets
        .route("/resourcequotas", get(api::handle_resource_quotas))
        .route("/limitranges", get(api::handle_limit_ranges))
        .route(
            "/poddisruptionbudgets",
            get(api::handle_pod_disruption_budgets),
        );

    Router::new()
        .route("/healthz", get(api::handle_healthz))
        .route("/api/clusters", get(api::handle_list_clusters))
        .nest("/api/clusters/{cluster}", cluster)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
