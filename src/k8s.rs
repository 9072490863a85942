use crate::error::SyncResult;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client, api::ListParams};

/// Read-only view of the pods living in a namespace.
#[async_trait]
pub trait PodLister: Send + Sync {
    /// Pod names in the order the API server lists them.
    async fn pod_names(&self, namespace: &str) -> SyncResult<Vec<String>>;
}

pub async fn get_pods(client: Client, namespace: &str) -> SyncResult<Vec<Pod>> {
    let api: Api<Pod> = Api::namespaced(client, namespace);
    let list = api.list(&ListParams::default()).await?;
    Ok(list.items)
}

#[async_trait]
impl PodLister for Client {
    async fn pod_names(&self, namespace: &str) -> SyncResult<Vec<String>> {
        let pods = get_pods(self.clone(), namespace).await?;
        Ok(pods.into_iter().filter_map(|p| p.metadata.name).collect())
    }
}
