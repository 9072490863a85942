use crate::error::{SyncError, SyncResult};
use crate::k8s::PodLister;
use crate::kubectl::{Kubectl, args};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Queries pod state in one namespace.
pub struct NodeManager {
    namespace: String,
    pods: Arc<dyn PodLister>,
    kubectl: Arc<dyn Kubectl>,
}

impl NodeManager {
    pub fn new(namespace: impl Into<String>, pods: Arc<dyn PodLister>, kubectl: Arc<dyn Kubectl>) -> Self {
        Self { namespace: namespace.into(), pods, kubectl }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn get_pods_names(&self) -> SyncResult<Vec<String>> {
        self.pods.pod_names(&self.namespace).await
    }

    /// Polls once per second until no pod in the namespace is outside the
    /// `Running` phase, giving up after `timeout_seconds` checks.
    pub async fn wait_until_ready(&self, timeout_seconds: u64) -> SyncResult<()> {
        let cmd = args([
            "-n",
            self.namespace.as_str(),
            "get",
            "pods",
            "--field-selector=status.phase!=Running",
        ]);

        for attempt in 0..timeout_seconds {
            if attempt > 0 {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            let out = self.kubectl.run(&cmd).await?;
            if out.is_empty() {
                info!(namespace = %self.namespace, "all pods running");
                return Ok(());
            }
            debug!(pending = %out.trim_end(), "non-running pods");
            info!(
                namespace = %self.namespace,
                "not ready yet, waited {}/{} seconds",
                attempt,
                timeout_seconds
            );
        }

        Err(SyncError::NotReady {
            namespace: self.namespace.clone(),
            timeout_seconds,
        })
    }

    /// Looks the pod up with `kubectl get pod` but never reads the result, so
    /// every pod is reported as not terminating. A failed lookup still aborts.
    pub async fn is_terminating(&self, pod_name: &str) -> SyncResult<bool> {
        let _out = self
            .kubectl
            .run(&args(["-n", self.namespace.as_str(), "get", "pod", pod_name]))
            .await?;
        Ok(false)
    }
}
