//! Building blocks shared by the single-object descriptions.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::core::v1::{PodTemplateSpec, Toleration, Volume};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use super::{name_of, namespace_of};
use crate::helpers::{AgeStyle, age_of, filter_annotations};
use crate::models::views::{ObjectSummary, PodTemplateView, TemplateContainerView, VolumeView};

pub fn object_summary(meta: &ObjectMeta, now: DateTime<Utc>) -> ObjectSummary {
    ObjectSummary {
        name: name_of(meta),
        namespace: namespace_of(meta),
        labels: meta.labels.clone().unwrap_or_default(),
        annotations: filter_annotations(meta.annotations.clone()).unwrap_or_default(),
        created: meta
            .creation_timestamp
            .as_ref()
            .map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true)),
        age: age_of(meta.creation_timestamp.as_ref(), AgeStyle::Compact, now),
        controlled_by: meta
            .owner_references
            .as_ref()
            .and_then(|refs| refs.first())
            .map(|r| format!("{}/{}", r.kind, r.name)),
    }
}

/// `matchLabels` of a selector; expressions are not rendered.
pub fn selector_labels(selector: &LabelSelector) -> BTreeMap<String, String> {
    selector.match_labels.clone().unwrap_or_default()
}

fn volume_source(v: &Volume) -> &'static str {
    if v.secret.is_some() {
        "secret"
    } else if v.config_map.is_some() {
        "configMap"
    } else if v.projected.is_some() {
        "projected"
    } else if v.persistent_volume_claim.is_some() {
        "persistentVolumeClaim"
    } else if v.empty_dir.is_some() {
        "emptyDir"
    } else if v.host_path.is_some() {
        "hostPath"
    } else if v.downward_api.is_some() {
        "downwardAPI"
    } else if v.csi.is_some() {
        "csi"
    } else {
        "other"
    }
}

fn toleration(t: &Toleration) -> String {
    let key = t.key.as_deref().unwrap_or("*");
    let target = match t.value.as_deref() {
        Some(value) if t.operator.as_deref() != Some("Exists") => format!("{}={}", key, value),
        _ => key.to_string(),
    };
    match t.effect.as_deref() {
        Some(effect) if !effect.is_empty() => format!("{}:{}", target, effect),
        _ => target,
    }
}

pub fn pod_template_view(template: &PodTemplateSpec) -> PodTemplateView {
    let spec = template.spec.as_ref();

    PodTemplateView {
        labels: template
            .metadata
            .as_ref()
            .and_then(|m| m.labels.clone())
            .unwrap_or_default(),
        containers: spec
            .map(|s| {
                s.containers
                    .iter()
                    .map(|c| TemplateContainerView {
                        name: c.name.clone(),
                        image: c.image.clone().unwrap_or_default(),
                        ports: c.ports.iter().flatten().map(|p| p.container_port).collect(),
                        env: c.env.iter().flatten().map(|e| e.name.clone()).collect(),
                        mounts: c
                            .volume_mounts
                            .iter()
                            .flatten()
                            .map(|m| m.mount_path.clone())
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        volumes: spec
            .and_then(|s| s.volumes.as_ref())
            .map(|vols| {
                vols.iter()
                    .map(|v| VolumeView {
                        name: v.name.clone(),
                        source: volume_source(v).to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        node_selector: spec.and_then(|s| s.node_selector.clone()).unwrap_or_default(),
        tolerations: spec
            .and_then(|s| s.tolerations.as_ref())
            .map(|ts| ts.iter().map(toleration).collect())
            .unwrap_or_default(),
    }
}
