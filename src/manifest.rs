//! Just enough of a Deployment manifest to locate the Jupyter container and
//! its shared folder. Anything that does not look like one is skipped.

use crate::error::{SyncError, SyncResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SHARED_FOLDER_ENV: &str = "SHARED_FOLDER_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub spec: Option<DeploymentSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeploymentSpec {
    pub template: Option<PodTemplate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PodTemplate {
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PodSpec {
    pub containers: Vec<Container>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Container {
    pub name: Option<String>,
    pub image: Option<String>,
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl Manifest {
    pub fn containers(&self) -> &[Container] {
        self.spec
            .as_ref()
            .and_then(|s| s.template.as_ref())
            .and_then(|t| t.spec.as_ref())
            .map(|s| s.containers.as_slice())
            .unwrap_or_default()
    }

    /// `SHARED_FOLDER_PATH` as declared on the first container only.
    ///
    /// The first variable with that name decides; if it carries no literal
    /// value (e.g. `valueFrom`), the manifest has none. An empty value counts.
    pub fn shared_folder_path(&self) -> Option<&str> {
        self.containers()
            .first()?
            .env
            .iter()
            .find(|e| e.name.as_deref() == Some(SHARED_FOLDER_ENV))?
            .value
            .as_deref()
    }
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

/// YAML files directly under `dir`, sorted by name.
pub fn deployment_files(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| SyncError::ManifestDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_yaml_file(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Parses every document of every manifest file in `dir`.
///
/// Unreadable files and documents that fail to deserialize are logged and
/// dropped; only an unreadable directory is an error.
pub fn load_manifests(dir: &Path) -> SyncResult<Vec<Manifest>> {
    let mut manifests = Vec::new();
    for file in deployment_files(dir)? {
        let text = match std::fs::read_to_string(&file) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %file.display(), error = %e, "skipping unreadable manifest");
                continue;
            }
        };
        manifests.extend(parse_documents(&file, &text));
    }
    Ok(manifests)
}

fn parse_documents(file: &Path, text: &str) -> Vec<Manifest> {
    let mut docs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        match Manifest::deserialize(document) {
            Ok(m) => docs.push(m),
            Err(e) => {
                debug!(path = %file.display(), error = %e, "skipping malformed manifest document");
                break;
            }
        }
    }
    docs
}

/// Every `(image, container name)` pair, in file then container order.
pub fn image_container_pairs(manifests: &[Manifest]) -> Vec<(String, String)> {
    manifests
        .iter()
        .flat_map(|m| m.containers())
        .filter_map(|c| Some((c.image.clone()?, c.name.clone()?)))
        .collect()
}

/// First manifest declaring a shared folder wins; later ones are not checked.
pub fn shared_folder_path(manifests: &[Manifest]) -> Option<String> {
    manifests.iter().find_map(|m| m.shared_folder_path()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const JUPYTER_APP: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: jupyter
spec:
  template:
    spec:
      containers:
        - name: jupyter
          image: cicd.ai4eu-dev.eu/graphene/jupyter-connect:latest
          env:
            - name: OTHER
              value: "x"
            - name: SHARED_FOLDER_PATH
              value: /mnt/shared
        - name: sidecar
          image: busybox
"#;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn only_yaml_files_are_listed_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.yml", "");
        write(dir.path(), "a.yaml", "");
        write(dir.path(), "notes.txt", "");
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let files = deployment_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.yaml", "b.yml"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifests(&dir.path().join("deployments")).unwrap_err();
        assert!(matches!(err, SyncError::ManifestDir { .. }));
    }

    #[test]
    fn extracts_pairs_and_shared_folder() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.yaml", JUPYTER_APP);

        let manifests = load_manifests(dir.path()).unwrap();
        assert_eq!(
            image_container_pairs(&manifests),
            vec![
                ("cicd.ai4eu-dev.eu/graphene/jupyter-connect:latest".to_string(), "jupyter".to_string()),
                ("busybox".to_string(), "sidecar".to_string()),
            ]
        );
        assert_eq!(shared_folder_path(&manifests).as_deref(), Some("/mnt/shared"));
    }

    #[test]
    fn malformed_and_foreign_documents_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a-broken.yaml", "spec: [unclosed");
        write(dir.path(), "b-service.yaml", "kind: Service\nspec:\n  ports: []\n");
        write(dir.path(), "c-wrongtype.yaml", "spec:\n  template:\n    spec:\n      containers: 3\n");
        write(dir.path(), "d-app.yaml", JUPYTER_APP);

        let manifests = load_manifests(dir.path()).unwrap();
        assert_eq!(image_container_pairs(&manifests).len(), 2);
        assert_eq!(shared_folder_path(&manifests).as_deref(), Some("/mnt/shared"));
    }

    #[test]
    fn shared_folder_is_read_from_first_container_only() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "app.yaml",
            r#"
spec:
  template:
    spec:
      containers:
        - name: main
          image: nginx
        - name: jupyter
          image: jupyter
          env:
            - name: SHARED_FOLDER_PATH
              value: /ignored
"#,
        );
        let manifests = load_manifests(dir.path()).unwrap();
        assert_eq!(shared_folder_path(&manifests), None);
    }

    #[test]
    fn first_file_with_a_shared_folder_wins() {
        let dir = tempfile::tempdir().unwrap();
        let app = |path: &str| {
            format!(
                "spec:\n  template:\n    spec:\n      containers:\n        - name: c\n          image: i\n          env:\n            - name: SHARED_FOLDER_PATH\n              value: {path}\n"
            )
        };
        write(dir.path(), "a.yaml", "kind: ConfigMap\n");
        write(dir.path(), "b.yaml", &app("/first"));
        write(dir.path(), "c.yaml", &app("/second"));

        let manifests = load_manifests(dir.path()).unwrap();
        assert_eq!(shared_folder_path(&manifests).as_deref(), Some("/first"));
    }

    #[test]
    fn empty_shared_folder_still_ends_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.yaml",
            "spec:\n  template:\n    spec:\n      containers:\n        - name: jupyter\n          image: i\n          env:\n            - name: SHARED_FOLDER_PATH\n              value: \"\"\n",
        );
        write(
            dir.path(),
            "b.yaml",
            "spec:\n  template:\n    spec:\n      containers:\n        - name: other\n          image: j\n          env:\n            - name: SHARED_FOLDER_PATH\n              value: /later\n",
        );
        let manifests = load_manifests(dir.path()).unwrap();
        assert_eq!(shared_folder_path(&manifests).as_deref(), Some(""));
    }

    #[test]
    fn every_document_in_a_file_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "all.yaml",
            "kind: Service\n---\nspec:\n  template:\n    spec:\n      containers:\n        - name: jupyter\n          image: img\n",
        );
        let manifests = load_manifests(dir.path()).unwrap();
        assert_eq!(
            image_container_pairs(&manifests),
            vec![("img".to_string(), "jupyter".to_string())]
        );
    }
}
