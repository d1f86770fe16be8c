use chrono::{DateTime, Utc};
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};

use super::describe::selector_labels;
use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::{IngressView, NetworkPolicyView};

const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";

/// `spec.ingressClassName`, then the legacy annotation, then `"None"`.
fn ingress_class(ing: &Ingress) -> String {
    ing.spec
        .as_ref()
        .and_then(|s| s.ingress_class_name.clone())
        .or_else(|| {
            ing.metadata
                .annotations
                .as_ref()
                .and_then(|a| a.get(INGRESS_CLASS_ANNOTATION).cloned())
        })
        .unwrap_or_else(|| "None".to_string())
}

pub fn ingress_view(ing: &Ingress, now: DateTime<Utc>) -> IngressView {
    IngressView {
        namespace: namespace_of(&ing.metadata),
        name: name_of(&ing.metadata),
        class: ingress_class(ing),
        hosts: ing
            .spec
            .as_ref()
            .and_then(|s| s.rules.as_ref())
            .map(|rules| rules.iter().filter_map(|r| r.host.clone()).collect())
            .unwrap_or_default(),
        age: age_of(ing.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_ingresses<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<IngressView>> {
    let items: Vec<Ingress> = logged(
        "ingresses",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items.iter().map(|i| ingress_view(i, now)).collect())
}

pub fn network_policy_view(np: &NetworkPolicy, now: DateTime<Utc>) -> NetworkPolicyView {
    let spec = np.spec.as_ref();
    let selector = spec.map(|s| selector_labels(&s.pod_selector)).unwrap_or_default();

    NetworkPolicyView {
        namespace: namespace_of(&np.metadata),
        name: name_of(&np.metadata),
        pod_selector: if selector.is_empty() {
            "None".to_string()
        } else {
            selector
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ")
        },
        policy_types: spec.and_then(|s| s.policy_types.clone()).unwrap_or_default(),
        age: age_of(np.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_network_policies<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<NetworkPolicyView>> {
    let items: Vec<NetworkPolicy> = logged(
        "networkpolicies",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )?;
    Ok(items.iter().map(|np| network_policy_view(np, now)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::networking::v1::{IngressRule, IngressSpec, NetworkPolicySpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

    #[tokio::test]
    async fn test_ingress_rows() {
        let mut legacy = meta("web", "old-front", Duration::days(400));
        legacy.annotations = Some([(INGRESS_CLASS_ANNOTATION.to_string(), "traefik".to_string())].into());

        let cluster = FakeCluster::new().with(vec![
            Ingress {
                metadata: meta("web", "front", Duration::days(4)),
                spec: Some(IngressSpec {
                    ingress_class_name: Some("nginx".to_string()),
                    rules: Some(vec![
                        IngressRule {
                            host: Some("shop.example.com".to_string()),
                            ..Default::default()
                        },
                        IngressRule::default(),
                    ]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            Ingress {
                metadata: legacy,
                ..Default::default()
            },
            Ingress {
                metadata: meta("web", "bare", Duration::days(1)),
                ..Default::default()
            },
        ]);

        let rows = list_ingresses(&cluster, &Scope::All, now()).await.unwrap();
        assert_eq!(rows[0].class, "nginx");
        assert_eq!(rows[0].hosts, vec!["shop.example.com".to_string()]);
        assert_eq!(rows[1].class, "traefik");
        assert_eq!(rows[1].age, "1y");
        assert_eq!(rows[2].class, "None");
        assert!(rows[2].hosts.is_empty());
    }

    #[tokio::test]
    async fn test_network_policy_selector() {
        let cluster = FakeCluster::new().with(vec![
            NetworkPolicy {
                metadata: meta("web", "allow-front", Duration::hours(6)),
                spec: Some(NetworkPolicySpec {
                    pod_selector: LabelSelector {
                        match_labels: Some(
                            [
                                ("app".to_string(), "front".to_string()),
                                ("tier".to_string(), "web".to_string()),
                            ]
                            .into(),
                        ),
                        ..Default::default()
                    },
                    policy_types: Some(vec!["Ingress".to_string()]),
                    ..Default::default()
                }),
            },
            NetworkPolicy {
                metadata: meta("web", "default-deny", Duration::hours(6)),
                spec: Some(NetworkPolicySpec::default()),
            },
        ]);

        let rows = list_network_policies(&cluster, &Scope::Namespace("web".to_string()), now())
            .await
            .unwrap();
        assert_eq!(rows[0].pod_selector, "app=front, tier=web");
        assert_eq!(rows[0].policy_types, vec!["Ingress".to_string()]);
        assert_eq!(rows[1].pod_selector, "None");
        assert_eq!(rows[1].age, "6h");
    }
}
