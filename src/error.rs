use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sync run.
///
/// Manifest parse problems are deliberately absent: a file that cannot be
/// read as a deployment simply contributes nothing to the scan.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Kubectl {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("cannot read manifest directory {}: {source}", path.display())]
    ManifestDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no running Jupyter pod found in namespace {namespace}")]
    JupyterPodNotFound { namespace: String },

    #[error("namespace {namespace} still has non-running pods after {timeout_seconds} checks")]
    NotReady {
        namespace: String,
        timeout_seconds: u64,
    },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
