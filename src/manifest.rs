//! Project and per-directory build manifests.
//!
//! Two JSON files drive a run:
//!
//! - `vss-extension.json` (repository root): the ordered list of task
//!   directories under its `files` field. Required; loaded once at startup.
//! - `make.json` (per task directory, optional): declares third-party
//!   archives to fetch under `externals.archivePackages`. A missing or
//!   unparsable file counts as "no externals configured".

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name of the project manifest, relative to the repository root.
pub const PROJECT_MANIFEST: &str = "vss-extension.json";

/// File name of the optional per-directory build manifest.
pub const BUILD_MANIFEST: &str = "make.json";

/// Failure to load the project manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("project manifest not found at {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed project manifest {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry of the project manifest's `files` list.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    /// Task directory, relative to the repository root.
    pub path: String,
}

/// The project manifest (`vss-extension.json`).
///
/// Only `files` is consumed; the extension metadata around it is ignored.
#[derive(Debug, Deserialize)]
pub struct ProjectManifest {
    pub files: Vec<FileEntry>,
}

impl ProjectManifest {
    /// Load the project manifest from `root/vss-extension.json`.
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let path = root.join(PROJECT_MANIFEST);
        if !path.exists() {
            return Err(ManifestError::Missing { path });
        }
        let content = std::fs::read_to_string(&path).map_err(|source| {
            ManifestError::Unreadable {
                path: path.clone(),
                source,
            }
        })?;
        serde_json::from_str(&content).map_err(|source| ManifestError::Malformed { path, source })
    }

    /// Task directories in manifest order.
    pub fn task_dirs(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}

/// One archive package declared under `externals.archivePackages`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ArchivePackage {
    /// URL of the zip archive.
    pub url: String,
    /// Extraction destination, relative to the owning task directory.
    pub dest: String,
}

/// The `externals` section of a build manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Externals {
    #[serde(default, rename = "archivePackages")]
    pub archive_packages: Vec<ArchivePackage>,
}

/// The optional per-directory build manifest (`make.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub externals: Externals,
}

impl BuildManifest {
    /// Load `dir/make.json`, substituting an empty manifest on any failure.
    ///
    /// The fallback is deliberate: a task without a `make.json` (or with a
    /// broken one) simply has no externals to install.
    pub fn load_or_default(dir: &Path) -> Self {
        Self::load(dir).unwrap_or_default()
    }

    fn load(dir: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(dir.join(BUILD_MANIFEST))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Archive packages in declaration order.
    pub fn archive_packages(&self) -> &[ArchivePackage] {
        &self.externals.archive_packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_manifest_load() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_MANIFEST),
            r#"{
                "manifestVersion": 1,
                "files": [
                    {"path": "Tasks/AADAccessTokenAuth"},
                    {"path": "Tasks/CargoAuthNew", "packagePath": "x"}
                ]
            }"#,
        )
        .unwrap();

        let manifest = ProjectManifest::load(dir.path()).unwrap();
        let dirs: Vec<&str> = manifest.task_dirs().collect();
        assert_eq!(dirs, ["Tasks/AADAccessTokenAuth", "Tasks/CargoAuthNew"]);
    }

    #[test]
    fn test_project_manifest_missing() {
        let dir = tempdir().unwrap();
        let err = ProjectManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Missing { .. }));
    }

    #[test]
    fn test_project_manifest_missing_files_field() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_MANIFEST), r#"{"name": "ext"}"#).unwrap();
        let err = ProjectManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn test_project_manifest_invalid_json() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_MANIFEST), "not json {").unwrap();
        let err = ProjectManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn test_build_manifest_full() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(BUILD_MANIFEST),
            r#"{
                "externals": {
                    "archivePackages": [
                        {"url": "https://example.com/a.zip", "dest": "lib"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let manifest = BuildManifest::load_or_default(dir.path());
        assert_eq!(
            manifest.archive_packages(),
            [ArchivePackage {
                url: "https://example.com/a.zip".into(),
                dest: "lib".into(),
            }]
        );
    }

    #[test]
    fn test_build_manifest_absent_is_empty() {
        let dir = tempdir().unwrap();
        let manifest = BuildManifest::load_or_default(dir.path());
        assert!(manifest.archive_packages().is_empty());
    }

    #[test]
    fn test_build_manifest_broken_is_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(BUILD_MANIFEST), "{{{{").unwrap();
        let manifest = BuildManifest::load_or_default(dir.path());
        assert!(manifest.archive_packages().is_empty());
    }

    #[test]
    fn test_build_manifest_no_externals_section() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(BUILD_MANIFEST), r#"{"other": true}"#).unwrap();
        let manifest = BuildManifest::load_or_default(dir.path());
        assert!(manifest.archive_packages().is_empty());
    }
}
