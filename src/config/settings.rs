//! Tool settings for Ralph.
//!
//! Handles loading settings from TOML files. These control where Ralph
//! looks for things, not what the review pipeline does.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default guidance document holding the configuration blocks.
pub const DEFAULT_DOCUMENT: &str = "CLAUDE.md";

/// Default review state filename.
pub const REVIEW_STATE_FILENAME: &str = ".ralph-review-state.json";

/// Default manifest filename.
pub const MANIFEST_FILENAME: &str = ".ralph-manifest.json";

/// Project-local settings filename.
pub const LOCAL_SETTINGS_FILENAME: &str = ".ralph.toml";

/// Ralph settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Document carrying the RALPH configuration blocks
    pub document: PathBuf,

    /// Review state file, relative to the project root
    pub state_file: PathBuf,

    /// Manifest file, relative to the skills target directory
    pub manifest_file: PathBuf,

    /// Directory containing reviewer skills (supports `~` and `$VAR`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<String>,

    /// Reviewer detection settings
    pub detection: DetectionSettings,
}

/// Reviewer detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Directory names skipped during the recursive project scan
    pub ignore_dirs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            document: PathBuf::from(DEFAULT_DOCUMENT),
            state_file: PathBuf::from(REVIEW_STATE_FILENAME),
            manifest_file: PathBuf::from(MANIFEST_FILENAME),
            skills_dir: None,
            detection: DetectionSettings::default(),
        }
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            ignore_dirs: [
                ".git",
                "node_modules",
                "target",
                ".venv",
                "venv",
                "__pycache__",
                "dist",
                "build",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}

impl Settings {
    /// Load settings for a project.
    ///
    /// Looks for settings in:
    /// 1. `.ralph.toml` in the project root
    /// 2. `~/.config/ralph/config.toml`
    /// 3. Falls back to defaults
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let local = project_root.join(LOCAL_SETTINGS_FILENAME);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Some(global) = Self::config_dir().map(|d| d.join("config.toml")) {
            if global.exists() {
                return Self::load_from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!(path = ?path, "Loaded settings");
        Ok(settings)
    }

    /// Get the global settings directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ralph"))
    }

    /// Absolute path of the guidance document.
    pub fn document_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.document)
    }

    /// Absolute path of the review state file.
    pub fn state_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.state_file)
    }

    /// Resolved skills directory, with `~` and environment variables expanded.
    ///
    /// Relative paths are resolved against the project root. Defaults to
    /// `<project>/.claude/skills`.
    pub fn skills_path(&self, project_root: &Path) -> anyhow::Result<PathBuf> {
        let Some(raw) = self.skills_dir.as_deref() else {
            return Ok(project_root.join(".claude").join("skills"));
        };

        let expanded = shellexpand::full(raw)
            .with_context(|| format!("Failed to expand skills_dir '{raw}'"))?;
        let path = PathBuf::from(expanded.as_ref());
        Ok(if path.is_absolute() { path } else { project_root.join(path) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.document, PathBuf::from("CLAUDE.md"));
        assert_eq!(settings.state_file, PathBuf::from(".ralph-review-state.json"));
        assert!(settings.detection.ignore_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_settings_deserialization() {
        let toml_str = r#"
document = "AGENTS.md"

[detection]
ignore_dirs = ["vendor"]
"#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.document, PathBuf::from("AGENTS.md"));
        assert_eq!(settings.state_file, PathBuf::from(REVIEW_STATE_FILENAME));
        assert_eq!(settings.detection.ignore_dirs, vec!["vendor".to_string()]);
    }

    #[test]
    fn test_load_prefers_local_file() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(LOCAL_SETTINGS_FILENAME), "state_file = \"state.json\"\n")
            .unwrap();

        let settings = Settings::load(temp.path()).unwrap();
        assert_eq!(settings.state_path(temp.path()), temp.path().join("state.json"));
    }

    #[test]
    fn test_invalid_local_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(LOCAL_SETTINGS_FILENAME), "document = [").unwrap();

        assert!(Settings::load(temp.path()).is_err());
    }

    #[test]
    fn test_skills_path_resolution() {
        let root = Path::new("/project");
        let mut settings = Settings::default();
        assert_eq!(settings.skills_path(root).unwrap(), PathBuf::from("/project/.claude/skills"));

        settings.skills_dir = Some("skills".to_string());
        assert_eq!(settings.skills_path(root).unwrap(), PathBuf::from("/project/skills"));

        settings.skills_dir = Some("/opt/skills".to_string());
        assert_eq!(settings.skills_path(root).unwrap(), PathBuf::from("/opt/skills"));
    }
}
