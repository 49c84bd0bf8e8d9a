//! Project language detection.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::DetectionSettings;

/// Programming languages that can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Bicep,
}

impl Language {
    /// Get the language tag used in reviewer configuration.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Bicep => "bicep",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Root marker files and the language each one implies.
const LANGUAGE_MARKERS: &[(&str, Language)] = &[
    ("pyproject.toml", Language::Python),
    ("setup.py", Language::Python),
    ("requirements.txt", Language::Python),
    ("package.json", Language::JavaScript),
    ("tsconfig.json", Language::TypeScript),
    ("go.mod", Language::Go),
    ("Cargo.toml", Language::Rust),
];

/// Language detector for a project directory.
pub struct LanguageDetector<'a> {
    path: &'a Path,
    ignore_dirs: Vec<String>,
}

impl<'a> LanguageDetector<'a> {
    /// Create a new language detector.
    pub fn new(path: &'a Path) -> Self {
        Self { path, ignore_dirs: DetectionSettings::default().ignore_dirs }
    }

    /// Create a new detector using the given detection settings.
    pub fn with_settings(path: &'a Path, settings: &DetectionSettings) -> Self {
        Self { path, ignore_dirs: settings.ignore_dirs.clone() }
    }

    /// Detect all languages used in the project.
    pub fn detect(&self) -> BTreeSet<Language> {
        let mut detected: BTreeSet<Language> = LANGUAGE_MARKERS
            .iter()
            .filter(|(marker, _)| self.path.join(marker).exists())
            .map(|(_, language)| *language)
            .collect();

        if self.has_bicep_files() {
            detected.insert(Language::Bicep);
        }

        detected
    }

    /// Check whether a specific language is detected.
    pub fn has_language(&self, language: Language) -> bool {
        self.detect().contains(&language)
    }

    fn has_bicep_files(&self) -> bool {
        WalkDir::new(self.path)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !self.ignore_dirs.iter().any(|d| e.file_name().to_string_lossy() == *d)
            })
            .filter_map(Result::ok)
            .any(|e| e.file_type().is_file() && e.file_name().to_string_lossy().ends_with(".bicep"))
    }
}

/// Detect all languages in a project directory.
pub fn detect_languages(project_root: &Path) -> BTreeSet<Language> {
    LanguageDetector::new(project_root).detect()
}
