//! Roles and role bindings, namespaced and cluster-wide.

use chrono::{DateTime, Utc};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{RoleBindingView, RoleView};

fn role_view(meta: &ObjectMeta, rules: usize, now: DateTime<Utc>) -> RoleView {
    RoleView {
        namespace: namespace_of(meta),
        name: name_of(meta),
        rules,
        age: age_of(meta.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

/// Splits subjects by kind. A service account without a namespace is taken
/// to live beside the binding.
fn binding_view(
    meta: &ObjectMeta,
    role_ref: &RoleRef,
    subjects: Option<&Vec<Subject>>,
    now: DateTime<Utc>,
) -> RoleBindingView {
    let namespace = namespace_of(meta);
    let mut view = RoleBindingView {
        name: name_of(meta),
        role: format!("{}/{}", role_ref.kind, role_ref.name),
        age: age_of(meta.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        ..Default::default()
    };

    for subject in subjects.into_iter().flatten() {
        match subject.kind.as_str() {
            "User" => view.users.push(subject.name.clone()),
            "Group" => view.groups.push(subject.name.clone()),
            "ServiceAccount" => view.service_accounts.push(format!(
                "{}/{}",
                subject.namespace.as_deref().unwrap_or(&namespace),
                subject.name
            )),
            _ => {}
        }
    }
    view.namespace = namespace;
    view
}

pub async fn list_roles<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<RoleView>> {
    let items: Vec<Role> = logged("roles", scope, cluster.list(scope, &ListOptions::default()).await)?;
    Ok(items
        .iter()
        .map(|r| role_view(&r.metadata, r.rules.as_ref().map(Vec::len).unwrap_or(0), now))
        .collect())
}

pub async fn list_cluster_roles<C: ClusterApi>(
    cluster: &C,
    now: DateTime<Utc>,
) -> FetchResult<Vec<RoleView>> {
    let items: Vec<ClusterRole> = logged(
        "clusterroles",
        &Scope::All,
        cluster.list_cluster(&ListOptions::default()).await,
    )?;
    Ok(items
        .iter()
        .map(|r| role_view(&r.metadata, r.rules.as_ref().map(Vec::len).unwrap_or(0), now))
        .collect())
}

pub async fn list_role_bindings<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<RoleBindingView>> {
    let items: Vec<RoleBinding> = logged(
        "rolebindings",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items
        .iter()
        .map(|b| binding_view(&b.metadata, &b.role_ref, b.subjects.as_ref(), now))
        .collect())
}

pub async fn list_cluster_role_bindings<C: ClusterApi>(
    cluster: &C,
    now: DateTime<Utc>,
) -> FetchResult<Vec<RoleBindingView>> {
    let items: Vec<ClusterRoleBinding> = logged(
        "clusterrolebindings",
        &Scope::All,
        cluster.list_cluster(&ListOptions::default()).await,
    )?;
    Ok(items
        .iter()
        .map(|b| binding_view(&b.metadata, &b.role_ref, b.subjects.as_ref(), now))
        .collect())
}
