use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Endpoints, Service, ServicePort};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::debug;

use super::describe::object_summary;
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::{FetchError, FetchResult};
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{
    EndpointSubsetView, EndpointView, ServiceDescription, ServicePortView, ServiceView,
};

/// Comma-joined load-balancer ingress IPs, or `"None"`.
pub fn external_ip(svc: &Service) -> String {
    let ips: Vec<&str> = svc
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .map(|ingress| ingress.iter().filter_map(|i| i.ip.as_deref()).collect())
        .unwrap_or_default();

    if ips.is_empty() {
        "None".to_string()
    } else {
        ips.join(", ")
    }
}

pub fn service_view(svc: &Service, now: DateTime<Utc>) -> ServiceView {
    let spec = svc.spec.as_ref();

    ServiceView {
        namespace: namespace_of(&svc.metadata),
        name: name_of(&svc.metadata),
        service_type: spec.and_then(|s| s.type_.clone()).unwrap_or_default(),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
        external_ip: external_ip(svc),
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| format!("{}/{}", p.port, p.protocol.as_deref().unwrap_or("TCP")))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
        selector: spec.and_then(|s| s.selector.clone()).unwrap_or_default(),
        age: age_of(svc.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_services<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<ServiceView>> {
    let items: Vec<Service> = logged(
        "services",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items.iter().map(|s| service_view(s, now)).collect())
}

pub fn endpoint_view(ep: &Endpoints, now: DateTime<Utc>) -> EndpointView {
    EndpointView {
        namespace: namespace_of(&ep.metadata),
        name: name_of(&ep.metadata),
        // First address of each subset only.
        endpoints: ep
            .subsets
            .iter()
            .flatten()
            .map(|subset| {
                subset
                    .addresses
                    .as_ref()
                    .and_then(|a| a.first())
                    .map(|a| a.ip.clone())
                    .unwrap_or_else(|| "N/A".to_string())
            })
            .collect(),
        age: age_of(ep.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_endpoints<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<EndpointView>> {
    let items: Vec<Endpoints> = logged(
        "endpoints",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items.iter().map(|e| endpoint_view(e, now)).collect())
}

fn port_view(p: &ServicePort) -> ServicePortView {
    ServicePortView {
        name: p.name.clone().unwrap_or_default(),
        protocol: p.protocol.clone().unwrap_or_else(|| "TCP".to_string()),
        port: p.port,
        // An unset target port means the service port itself.
        target_port: match &p.target_port {
            Some(IntOrString::Int(n)) => n.to_string(),
            Some(IntOrString::String(name)) => name.clone(),
            None => p.port.to_string(),
        },
        node_port: p.node_port,
    }
}

fn subset_views(ep: &Endpoints) -> Vec<EndpointSubsetView> {
    ep.subsets
        .iter()
        .flatten()
        .map(|subset| EndpointSubsetView {
            addresses: subset.addresses.iter().flatten().map(|a| a.ip.clone()).collect(),
            ports: subset
                .ports
                .iter()
                .flatten()
                .map(|p| format!("{}/{}", p.port, p.protocol.as_deref().unwrap_or("TCP")))
                .collect(),
        })
        .collect()
}

pub fn service_description(
    svc: &Service,
    endpoints: Option<&Endpoints>,
    now: DateTime<Utc>,
) -> ServiceDescription {
    let spec = svc.spec.as_ref();

    ServiceDescription {
        meta: object_summary(&svc.metadata, now),
        service_type: spec.and_then(|s| s.type_.clone()).unwrap_or_default(),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| ports.iter().map(port_view).collect())
            .unwrap_or_default(),
        selector: spec.and_then(|s| s.selector.clone()).unwrap_or_default(),
        load_balancer_ip: svc
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|ingress| ingress.iter().find_map(|i| i.ip.clone()))
            .unwrap_or_else(|| "N/A".to_string()),
        external_ips: spec.and_then(|s| s.external_ips.clone()).unwrap_or_default(),
        ip_family_policy: spec.and_then(|s| s.ip_family_policy.clone()),
        ip_families: spec.and_then(|s| s.ip_families.clone()).unwrap_or_default(),
        session_affinity: spec.and_then(|s| s.session_affinity.clone()),
        internal_traffic_policy: spec.and_then(|s| s.internal_traffic_policy.clone()),
        endpoints: endpoints.map(subset_views).unwrap_or_default(),
    }
}

/// A service plus its Endpoints object. A service without one (headless with
/// no selector, or not yet reconciled) describes with no endpoints.
pub async fn describe_service<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<ServiceDescription> {
    let svc: Service = super::read(cluster, namespace, name).await?;
    let endpoints = match super::read::<Endpoints, _>(cluster, namespace, name).await {
        Ok(ep) => Some(ep),
        Err(FetchError::Api { code: 404, .. }) => {
            debug!("service {}/{} has no endpoints object", namespace, name);
            None
        }
        Err(e) => return Err(e),
    };
    Ok(service_description(&svc, endpoints.as_ref(), now))
}
