//! Installed-skill manifest.
//!
//! Records which skills a sync installed so they can be removed later.
//! Version 1 manifests list flat directory names; version 2 lists nested
//! skill paths such as `ralph/prd`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::write_file_atomic;
use crate::error::RalphResult;

/// Manifest format written by this version.
pub const MANIFEST_VERSION: u32 = 2;

/// Version assumed when a manifest carries no version field.
pub const LEGACY_MANIFEST_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    LEGACY_MANIFEST_VERSION
}

/// Skills installed by the last sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version
    #[serde(default = "legacy_version")]
    pub version: u32,

    /// Installed skill paths
    #[serde(default)]
    pub installed: Vec<String>,

    /// RFC 3339 time of the sync
    #[serde(rename = "syncedAt")]
    pub synced_at: String,
}

impl Manifest {
    /// Create a current-version manifest stamped with the current time.
    ///
    /// Keeps the given order, dropping repeated entries.
    pub fn new<I, S>(installed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for skill in installed.into_iter().map(Into::into) {
            if !unique.contains(&skill) {
                unique.push(skill);
            }
        }
        Self {
            version: MANIFEST_VERSION,
            installed: unique,
            synced_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whether this manifest predates nested skill paths.
    pub fn is_legacy(&self) -> bool {
        self.version < MANIFEST_VERSION
    }

    /// Flat entries left by a legacy sync. Empty for current manifests.
    pub fn legacy_entries(&self) -> Vec<&str> {
        if !self.is_legacy() {
            return Vec::new();
        }
        self.installed.iter().map(String::as_str).filter(|s| !s.contains('/')).collect()
    }
}

/// Load a manifest. Returns `Ok(None)` when the file does not exist.
pub fn load_manifest(path: &Path) -> RalphResult<Option<Manifest>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let manifest = serde_json::from_str(&content)?;
    Ok(Some(manifest))
}

/// Save a manifest as pretty JSON.
pub fn save_manifest(manifest: &Manifest, path: &Path) -> RalphResult<()> {
    let content = serde_json::to_string_pretty(manifest)?;
    write_file_atomic(path, &format!("{content}\n"))?;
    tracing::debug!(path = ?path, installed = manifest.installed.len(), "Saved manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RalphError;
    use tempfile::tempdir;

    #[test]
    fn test_new_keeps_order_and_stamps() {
        let manifest = Manifest::new(["reviewers/release", "ralph/prd", "reviewers/release", "ralph/tasks"]);
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.installed, vec!["reviewers/release", "ralph/prd", "ralph/tasks"]);
        assert!(chrono::DateTime::parse_from_rfc3339(&manifest.synced_at).is_ok());
        assert!(!manifest.is_legacy());
    }

    #[test]
    fn test_save_uses_camel_case_timestamp() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(".ralph-manifest.json");

        let manifest = Manifest::new(["ralph/prd"]);
        save_manifest(&manifest, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"syncedAt\""));
        assert!(!content.contains("synced_at"));
        assert!(content.ends_with("}\n"));

        assert_eq!(load_manifest(&path).unwrap(), Some(manifest));
    }

    #[test]
    fn test_load_missing() {
        let temp = tempdir().unwrap();
        assert!(load_manifest(&temp.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn test_load_legacy_without_version() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("m.json");
        std::fs::write(&path, r#"{"installed": ["ralph-prd", "ralph/tasks"], "syncedAt": "2024-01-01T00:00:00Z"}"#)
            .unwrap();

        let manifest = load_manifest(&path).unwrap().unwrap();
        assert_eq!(manifest.version, LEGACY_MANIFEST_VERSION);
        assert!(manifest.is_legacy());
        assert_eq!(manifest.legacy_entries(), vec!["ralph-prd"]);
    }

    #[test]
    fn test_load_corrupt_is_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("m.json");
        std::fs::write(&path, "{\"installed\": [").unwrap();

        assert!(matches!(load_manifest(&path), Err(RalphError::Json(_))));
    }
}
