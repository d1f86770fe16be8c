use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::filter_annotations;
use crate::models::k8s::NamespacedKind;

/// Fetches one object and renders it as YAML without the kubectl
/// last-applied annotation.
pub async fn object_yaml<K, C>(cluster: &C, namespace: &str, name: &str) -> FetchResult<String>
where
    K: NamespacedKind,
    C: ClusterApi,
{
    let mut obj: K = super::read(cluster, namespace, name).await?;

    let meta = obj.meta_mut();
    meta.annotations = filter_annotations(meta.annotations.take());

    Ok(serde_yaml::to_string(&obj)?)
}
