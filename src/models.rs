use std::fmt;
use std::path::{Path, PathBuf};

/// Images the Jupyter connect pod is known to run.
pub const JUPYTER_IMAGES: [&str; 2] = [
    "cicd.ai4eu-dev.eu/graphene/jupyter-connect:1.1",
    "cicd.ai4eu-dev.eu/graphene/jupyter-connect:latest",
];

/// Used when no manifest declares `SHARED_FOLDER_PATH`.
pub const FALLBACK_ROOT: &str = "/home/jovyan";

/// The two directories pushed into the pod.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyTarget {
    Protos,
    Deployments,
}

impl CopyTarget {
    /// Directory under the base path holding the files to send.
    pub fn local_dir(self) -> &'static str {
        match self {
            CopyTarget::Protos => "microservice",
            CopyTarget::Deployments => "deployments",
        }
    }

    /// Directory under the pod's shared folder receiving them.
    pub fn remote_subpath(self) -> &'static str {
        match self {
            CopyTarget::Protos => "jupyter_connect_tools/microservice",
            CopyTarget::Deployments => "jupyter_connect_tools/deployments",
        }
    }
}

/// A directory inside a pod, in the `pod:/dir/` form `kubectl cp` expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub pod: String,
    pub dir: PathBuf,
}

impl Destination {
    /// An empty shared folder puts `subpath` directly under `/`.
    pub fn new(pod: &str, shared_folder: Option<&str>, subpath: &str) -> Self {
        let root = match shared_folder {
            Some("") => Path::new("/"),
            Some(dir) => Path::new(dir),
            None => Path::new(FALLBACK_ROOT),
        };
        Self {
            pod: pod.to_string(),
            dir: root.join(subpath),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/", self.pod, self.dir.display())
    }
}

/// One `kubectl cp` invocation: local directory contents to a pod directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyPlan {
    pub source: PathBuf,
    pub destination: Destination,
}

impl CopyPlan {
    /// Source with a trailing separator so the directory contents are copied.
    pub fn source_arg(&self) -> String {
        let s = self.source.display().to_string();
        if s.ends_with('/') { s } else { format!("{s}/") }
    }

    pub fn kubectl_args(&self, namespace: &str) -> Vec<String> {
        vec![
            "-n".to_string(),
            namespace.to_string(),
            "cp".to_string(),
            self.source_arg(),
            self.destination.to_string(),
        ]
    }
}

impl fmt::Display for CopyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_arg(), self.destination)
    }
}
