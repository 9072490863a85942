use crate::error::{SyncError, SyncResult};
use crate::kubectl::Kubectl;
use crate::manifest;
use crate::models::{CopyPlan, CopyTarget, Destination, JUPYTER_IMAGES};
use crate::node_manager::NodeManager;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Pushes the solution's protocol files and deployment manifests into the
/// Jupyter connect pod.
pub struct Jupyter {
    base_path: PathBuf,
    images: Vec<String>,
    nodes: NodeManager,
    kubectl: Arc<dyn Kubectl>,
}

impl Jupyter {
    pub fn new(base_path: impl Into<PathBuf>, nodes: NodeManager, kubectl: Arc<dyn Kubectl>) -> Self {
        Self {
            base_path: base_path.into(),
            images: JUPYTER_IMAGES.iter().map(|s| s.to_string()).collect(),
            nodes,
            kubectl,
        }
    }

    /// Accept additional images as "the Jupyter container".
    pub fn with_extra_images(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        for image in extra {
            if !self.images.contains(&image) {
                self.images.push(image);
            }
        }
        self
    }

    /// Sends protos, then deployments. Returns the copies performed.
    pub async fn prepare_jupyter(&self) -> SyncResult<Vec<CopyPlan>> {
        let protos = self.send_protos_to_jupyter().await?;
        let deployments = self.send_deployment_to_jupyter().await?;
        Ok(vec![protos, deployments])
    }

    pub async fn send_deployment_to_jupyter(&self) -> SyncResult<CopyPlan> {
        self.send_to_jupyter(CopyTarget::Deployments).await
    }

    pub async fn send_protos_to_jupyter(&self) -> SyncResult<CopyPlan> {
        self.send_to_jupyter(CopyTarget::Protos).await
    }

    #[instrument(skip(self), fields(namespace = %self.nodes.namespace()))]
    async fn send_to_jupyter(&self, target: CopyTarget) -> SyncResult<CopyPlan> {
        let source = self.base_path.join(target.local_dir());
        info!(source = %source.display(), "sending files to jupyter");

        let pod = self
            .get_pod_name_jupyter()
            .await?
            .ok_or_else(|| SyncError::JupyterPodNotFound {
                namespace: self.nodes.namespace().to_string(),
            })?;
        info!(%pod, "jupyter pod");

        let shared_folder = self.shared_folder_path();
        match &shared_folder {
            Some(path) => info!(shared_folder = %path),
            None => info!("no shared folder declared, using fallback"),
        }

        let plan = CopyPlan {
            source,
            destination: Destination::new(&pod, shared_folder.as_deref(), target.remote_subpath()),
        };
        info!(destination = %plan.destination);

        self.kubectl.run(&plan.kubectl_args(self.nodes.namespace())).await?;
        Ok(plan)
    }

    fn deployments_dir(&self) -> PathBuf {
        self.base_path.join(CopyTarget::Deployments.local_dir())
    }

    /// Any failure to read or interpret the manifests means "no shared folder".
    fn shared_folder_path(&self) -> Option<String> {
        manifest::load_manifests(&self.deployments_dir())
            .ok()
            .and_then(|m| manifest::shared_folder_path(&m))
    }

    fn jupyter_container_name(&self, dir: &Path) -> SyncResult<Option<String>> {
        let manifests = manifest::load_manifests(dir)?;
        let found = manifest::image_container_pairs(&manifests)
            .into_iter()
            .find(|(image, _)| self.images.contains(image));

        Ok(found.map(|(image, container)| {
            info!(%image, %container, "jupyter image");
            container
        }))
    }

    /// First pod whose name contains the Jupyter container's name.
    pub async fn get_pod_name_jupyter(&self) -> SyncResult<Option<String>> {
        let Some(container) = self.jupyter_container_name(&self.deployments_dir())? else {
            error!(images = ?self.images, "no deployment manifest uses a Jupyter image");
            return Ok(None);
        };

        for pod in self.nodes.get_pods_names().await? {
            if !pod.contains(&container) {
                continue;
            }
            if self.nodes.is_terminating(&pod).await? {
                continue;
            }
            return Ok(Some(pod));
        }

        error!(%container, namespace = %self.nodes.namespace(), "no pod matches the jupyter container");
        Ok(None)
    }
}
