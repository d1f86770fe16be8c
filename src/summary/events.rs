use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;

use super::{logged, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::format_age;
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::EventView;

/// `component[, host]`, falling back to the reporting controller fields.
pub fn event_source(ev: &Event) -> String {
    let source = ev.source.as_ref();
    let component = source
        .and_then(|s| s.component.as_deref())
        .filter(|c| !c.is_empty());

    if let Some(component) = component {
        return match source.and_then(|s| s.host.as_deref()).filter(|h| !h.is_empty()) {
            Some(host) => format!("{}, {}", component, host),
            None => component.to_string(),
        };
    }

    let parts: Vec<&str> = [ev.reporting_component.as_deref(), ev.reporting_instance.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        "unknown".to_string()
    } else {
        parts.join(", ")
    }
}

fn involved_object(ev: &Event) -> String {
    let kind = ev.involved_object.kind.as_deref().unwrap_or("");
    let name = ev.involved_object.name.as_deref().unwrap_or("");
    if kind.is_empty() && name.is_empty() {
        String::new()
    } else {
        format!("{}/{}", kind, name)
    }
}

fn last_seen(ev: &Event, now: DateTime<Utc>) -> String {
    ev.last_timestamp
        .as_ref()
        .map(|t| t.0)
        .or_else(|| ev.event_time.as_ref().map(|t| t.0))
        .or_else(|| ev.metadata.creation_timestamp.as_ref().map(|t| t.0))
        .map(|t| format_age(t, now))
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn event_view(ev: &Event, now: DateTime<Utc>) -> EventView {
    EventView {
        namespace: namespace_of(&ev.metadata),
        message: ev.message.clone().unwrap_or_default(),
        object: involved_object(ev),
        source: event_source(ev),
        count: ev.count,
        last_seen: last_seen(ev, now),
        event_type: ev.type_.clone().unwrap_or_default(),
    }
}

pub async fn list_events<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    limit: Option<u32>,
    now: DateTime<Utc>,
) -> FetchResult<Vec<EventView>> {
    let opts = match limit {
        Some(n) => ListOptions::default().limit(n),
        None => ListOptions::default(),
    };
    let items: Vec<Event> = logged("events", scope, cluster.list(scope, &opts).await)?;
    Ok(items.iter().map(|e| event_view(e, now)).collect())
}

/// Events about one object as `reason: message` lines. A `kind` of `None`
/// matches on name alone.
pub async fn object_events<C: ClusterApi>(
    cluster: &C,
    namespace: &str,
    kind: Option<&str>,
    name: &str,
) -> FetchResult<String> {
    let scope = Scope::Namespace(namespace.to_string());
    let items: Vec<Event> = logged(
        "events",
        &scope,
        cluster.list(&scope, &ListOptions::default()).await,
    )?;

    let lines: Vec<String> = items
        .iter()
        .filter(|e| e.involved_object.name.as_deref() == Some(name))
        .filter(|e| kind.is_none() || e.involved_object.kind.as_deref() == kind)
        .map(|e| {
            format!(
                "{}: {}",
                e.reason.as_deref().unwrap_or(""),
                e.message.as_deref().unwrap_or("")
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::core::v1::{EventSource, ObjectReference};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    fn event(name: &str, kind: &str, object: &str, reason: &str) -> Event {
        Event {
            metadata: meta("shop", name, Duration::hours(1)),
            involved_object: ObjectReference {
                kind: Some(kind.to_string()),
                name: Some(object.to_string()),
                ..Default::default()
            },
            reason: Some(reason.to_string()),
            message: Some(format!("{} happened", reason)),
            source: Some(EventSource {
                component: Some("kubelet".to_string()),
                host: Some("worker-2".to_string()),
            }),
            count: Some(3),
            last_timestamp: Some(Time(now() - Duration::minutes(7))),
            type_: Some("Normal".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_source() {
        let ev = event("e1", "Pod", "web-1", "Pulled");
        assert_eq!(event_source(&ev), "kubelet, worker-2");

        let mut ev = event("e2", "Pod", "web-1", "Pulled");
        ev.source = Some(EventSource {
            component: Some("kubelet".to_string()),
            host: None,
        });
        assert_eq!(event_source(&ev), "kubelet");

        let mut ev = event("e3", "Deployment", "web", "ScalingReplicaSet");
        ev.source = None;
        ev.reporting_component = Some("deployment-controller".to_string());
        ev.reporting_instance = Some("cp-1".to_string());
        assert_eq!(event_source(&ev), "deployment-controller, cp-1");

        ev.reporting_component = None;
        ev.reporting_instance = None;
        assert_eq!(event_source(&ev), "unknown");
    }

    #[tokio::test]
    async fn test_event_rows_and_limit() {
        let cluster = FakeCluster::new().with(vec![
            event("e1", "Pod", "web-1", "Pulled"),
            event("e2", "Pod", "web-2", "BackOff"),
            event("e3", "Deployment", "web", "ScalingReplicaSet"),
        ]);

        let rows = list_events(&cluster, &Scope::All, None, now()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].object, "Pod/web-1");
        assert_eq!(rows[0].last_seen, "7m");
        assert_eq!(rows[0].count, Some(3));

        let limited = list_events(&cluster, &Scope::All, Some(2), now()).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_object_events_filter() {
        let cluster = FakeCluster::new().with(vec![
            event("e1", "Pod", "web", "Pulled"),
            event("e2", "Deployment", "web", "ScalingReplicaSet"),
            event("e3", "Pod", "other", "BackOff"),
        ]);

        let deploy = object_events(&cluster, "shop", Some("Deployment"), "web")
            .await
            .unwrap();
        assert_eq!(deploy, "ScalingReplicaSet: ScalingReplicaSet happened");

        let any = object_events(&cluster, "shop", None, "web").await.unwrap();
        assert_eq!(any.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_object_events_for_service_kinds() {
        let cluster = FakeCluster::new().with(vec![
            event("e1", "Service", "front", "EnsuringLoadBalancer"),
            event("e2", "ServiceAccount", "front", "TokenCreated"),
            event("e3", "Endpoints", "front", "FailedToUpdateEndpoint"),
        ]);

        let svc = object_events(&cluster, "shop", Some("Service"), "front").await.unwrap();
        assert_eq!(svc, "EnsuringLoadBalancer: EnsuringLoadBalancer happened");

        let sa = object_events(&cluster, "shop", Some("ServiceAccount"), "front")
            .await
            .unwrap();
        assert_eq!(sa, "TokenCreated: TokenCreated happened");

        let none = object_events(&cluster, "other", Some("Service"), "front").await.unwrap();
        assert!(none.is_empty());
    }
}
