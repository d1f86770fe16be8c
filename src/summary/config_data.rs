use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};

use super::describe::object_summary;
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{
    ConfigMapDescription, ConfigMapView, Counted, SecretDescription, SecretView,
};

pub const REDACTED: &str = "REDACTED";

pub fn configmap_view(cm: &ConfigMap, now: DateTime<Utc>) -> ConfigMapView {
    let keys = cm.data.as_ref().map(BTreeMap::len).unwrap_or(0)
        + cm.binary_data.as_ref().map(BTreeMap::len).unwrap_or(0);

    ConfigMapView {
        namespace: namespace_of(&cm.metadata),
        name: name_of(&cm.metadata),
        keys,
        age: age_of(cm.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_configmaps<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Counted<ConfigMapView>> {
    let items: Vec<ConfigMap> = logged(
        "configmaps",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(Counted::new(
        items.iter().map(|cm| configmap_view(cm, now)).collect(),
    ))
}

pub fn configmap_description(cm: &ConfigMap, now: DateTime<Utc>) -> ConfigMapDescription {
    ConfigMapDescription {
        meta: object_summary(&cm.metadata, now),
        data: cm.data.clone().unwrap_or_default(),
        binary_keys: cm
            .binary_data
            .iter()
            .flat_map(|d| d.keys())
            .cloned()
            .collect(),
    }
}

pub async fn describe_configmap<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<ConfigMapDescription> {
    let cm: ConfigMap = super::read(cluster, namespace, name).await?;
    Ok(configmap_description(&cm, now))
}

/// Secret keys, each mapped to [`REDACTED`].
fn redacted_keys(secret: &Secret) -> BTreeMap<String, String> {
    secret
        .data
        .iter()
        .flat_map(|d| d.keys())
        .map(|k| (k.clone(), REDACTED.to_string()))
        .collect()
}

fn secret_type(secret: &Secret) -> String {
    secret.type_.clone().unwrap_or_else(|| "Opaque".to_string())
}

/// Only the keys of a secret leave this function; every value is replaced.
pub fn secret_view(secret: &Secret, now: DateTime<Utc>) -> SecretView {
    SecretView {
        namespace: namespace_of(&secret.metadata),
        name: name_of(&secret.metadata),
        secret_type: secret_type(secret),
        data: redacted_keys(secret),
        age: age_of(secret.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

/// Same redaction as [`secret_view`], with labels and annotations added.
pub fn secret_description(secret: &Secret, now: DateTime<Utc>) -> SecretDescription {
    SecretDescription {
        meta: object_summary(&secret.metadata, now),
        secret_type: secret_type(secret),
        data: redacted_keys(secret),
    }
}

pub async fn describe_secret<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    name: &str,
    now: DateTime<Utc>,
) -> FetchResult<SecretDescription> {
    let secret: Secret = super::read(cluster, namespace, name).await?;
    Ok(secret_description(&secret, now))
}

pub async fn list_secrets<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Counted<SecretView>> {
    let items: Vec<Secret> = logged(
        "secrets",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(Counted::new(
        items.iter().map(|s| secret_view(s, now)).collect(),
    ))
}
