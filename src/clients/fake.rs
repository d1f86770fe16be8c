//! In-memory `ClusterApi` for tests.

use std::collections::{BTreeMap, HashMap};

use kube::{Resource, ResourceExt};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ClusterApi;
use crate::error::{FetchError, FetchResult};
use crate::models::k8s::{ClusterKind, ListOptions, NamespacedKind, Scope};

#[derive(Default)]
pub struct FakeCluster {
    objects: HashMap<String, Vec<serde_json::Value>>,
    failure: Option<FetchError>,
    /// Kinds whose listing fails even when `failure` is unset.
    failing_kinds: HashMap<String, FetchError>,
    calls: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `err`.
    pub fn failing(err: FetchError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub fn with<K>(mut self, objs: impl IntoIterator<Item = K>) -> Self
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let entry = self.objects.entry(K::kind(&()).to_string()).or_default();
        for obj in objs {
            entry.push(serde_json::to_value(&obj).expect("fixture serializes"));
        }
        self
    }

    pub fn fail_kind<K: Resource<DynamicType = ()>>(mut self, err: FetchError) -> Self {
        self.failing_kinds.insert(K::kind(&()).to_string(), err);
        self
    }

    /// Kinds listed so far, in call order, as `Kind@scope`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn check<K: Resource<DynamicType = ()>>(&self) -> FetchResult<()> {
        if let Some(ref err) = self.failure {
            return Err(err.clone());
        }
        if let Some(err) = self.failing_kinds.get(K::kind(&()).as_ref()) {
            return Err(err.clone());
        }
        Ok(())
    }

    fn all_of<K>(&self) -> Vec<K>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        self.objects
            .get(K::kind(&()).as_ref())
            .map(|values| {
                values
                    .iter()
                    .map(|v| serde_json::from_value(v.clone()).expect("fixture deserializes"))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn filtered<K>(&self, namespace: Option<&str>, opts: &ListOptions) -> Vec<K>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        let mut items: Vec<K> = self
            .all_of::<K>()
            .into_iter()
            .filter(|o| namespace.is_none() || o.meta().namespace.as_deref() == namespace)
            .filter(|o| matches_labels(opts, o.meta().labels.as_ref()))
            .collect();
        if let Some(limit) = opts.limit {
            items.truncate(limit as usize);
        }
        items
    }
}

fn not_found(kind: &str, namespace: &str, name: &str) -> FetchError {
    FetchError::Api {
        code: 404,
        reason: "NotFound".to_string(),
        message: format!("{} {:?} not found in namespace {:?}", kind, name, namespace),
    }
}

/// Client-side evaluation of an equality-only selector.
fn matches_labels(opts: &ListOptions, labels: Option<&BTreeMap<String, String>>) -> bool {
    let Some(ref sel) = opts.label_selector else {
        return true;
    };
    sel.split(',')
        .filter(|term| !term.trim().is_empty())
        .all(|term| match term.split_once('=') {
            Some((k, v)) => labels
                .and_then(|l| l.get(k.trim()))
                .is_some_and(|actual| actual == v.trim()),
            None => false,
        })
}

impl ClusterApi for FakeCluster {
    async fn list<K: NamespacedKind>(&self, scope: &Scope, opts: &ListOptions) -> FetchResult<Vec<K>> {
        self.calls.lock().push(format!("{}@{}", K::kind(&()), scope));
        self.check::<K>()?;
        Ok(self.filtered(scope.namespace(), opts))
    }

    async fn list_cluster<K: ClusterKind>(&self, opts: &ListOptions) -> FetchResult<Vec<K>> {
        self.calls.lock().push(format!("{}@cluster", K::kind(&())));
        self.check::<K>()?;
        Ok(self.filtered(None, opts))
    }

    async fn get<K: NamespacedKind>(&self, namespace: &str, name: &str) -> FetchResult<K> {
        self.check::<K>()?;
        self.all_of::<K>()
            .into_iter()
            .find(|o| o.namespace().as_deref() == Some(namespace) && o.name_any() == name)
            .ok_or_else(|| not_found(&K::kind(&()), namespace, name))
    }

    async fn server_version(&self) -> FetchResult<String> {
        if let Some(ref err) = self.failure {
            return Err(err.clone());
        }
        Ok("v1.31.0-fake".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_matching() {
        let labels: BTreeMap<String, String> = [
            ("component".to_string(), "etcd".to_string()),
            ("tier".to_string(), "control-plane".to_string()),
        ]
        .into();

        let opts = ListOptions::default().labels("component=etcd");
        assert!(matches_labels(&opts, Some(&labels)));
        assert!(!matches_labels(&opts, None));

        let opts = ListOptions::default().labels("component=etcd,tier=node");
        assert!(!matches_labels(&opts, Some(&labels)));

        assert!(matches_labels(&ListOptions::default(), None));
    }
}
