//! Reviewer detection.
//!
//! Scans a project tree once and proposes a reviewer set from what it
//! finds. The scan never writes anything.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::{DetectionSettings, ReviewerConfig, ReviewerLevel};

/// Facts gathered from a single walk of the project tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFacts {
    /// `*.py` files exist somewhere under the root
    pub python_files: bool,
    /// `*.bicep` files exist somewhere under the root
    pub bicep_files: bool,
    /// `.github/workflows` holds at least one `*.yml`/`*.yaml`
    pub ci_workflows: bool,
    /// Files follow a test naming convention
    pub test_files: bool,
    /// `CHANGELOG.md` exists at the root
    pub changelog: bool,
}

/// Reviewer detector for a project directory.
pub struct ReviewerDetector<'a> {
    path: &'a Path,
    ignore_dirs: Vec<String>,
}

impl<'a> ReviewerDetector<'a> {
    /// Create a new detector with the default ignore list.
    pub fn new(path: &'a Path) -> Self {
        Self::with_settings(path, &DetectionSettings::default())
    }

    /// Create a new detector using the given detection settings.
    pub fn with_settings(path: &'a Path, settings: &DetectionSettings) -> Self {
        Self { path, ignore_dirs: settings.ignore_dirs.clone() }
    }

    /// Walk the project once and record what it contains.
    pub fn scan(&self) -> ProjectFacts {
        let mut facts = ProjectFacts {
            ci_workflows: self.has_ci_workflows(),
            changelog: self.path.join("CHANGELOG.md").is_file(),
            ..ProjectFacts::default()
        };

        let walker = WalkDir::new(self.path).into_iter().filter_entry(|e| {
            // The root itself is never filtered, even if its name is ignored.
            e.depth() == 0 || !self.is_ignored(&e.file_name().to_string_lossy())
        });

        for entry in walker.filter_map(Result::ok).filter(|e| e.file_type().is_file()) {
            let name = entry.file_name().to_string_lossy();

            if name.ends_with(".py") {
                facts.python_files = true;
            }
            if name.ends_with(".bicep") {
                facts.bicep_files = true;
            }
            if is_test_file(&name) {
                facts.test_files = true;
            }

            if facts.python_files && facts.bicep_files && facts.test_files {
                break;
            }
        }

        tracing::debug!(path = ?self.path, ?facts, "Scanned project");
        facts
    }

    /// Detect which reviewers should be configured for this project.
    ///
    /// Always includes `code-simplifier` and `repo-structure`, followed by
    /// language reviewers, CI reviewers, test reviewers, and the release
    /// reviewer, in that order.
    pub fn detect(&self) -> Vec<ReviewerConfig> {
        reviewers_for(self.scan())
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == name)
    }

    fn has_ci_workflows(&self) -> bool {
        let workflows = self.path.join(".github").join("workflows");
        let Ok(entries) = std::fs::read_dir(workflows) else {
            return false;
        };

        entries.filter_map(Result::ok).any(|entry| {
            let path = entry.path();
            path.is_file() && path.extension().is_some_and(|ext| ext == "yml" || ext == "yaml")
        })
    }
}

/// Whether a file name follows a common test naming convention.
fn is_test_file(name: &str) -> bool {
    if let Some(stem) = name.strip_suffix(".py") {
        return stem.starts_with("test_") || stem.ends_with("_test");
    }
    if let Some(stem) = name.strip_suffix(".go") {
        return stem.ends_with("_test");
    }
    [".test.", ".spec."].iter().any(|p| name.contains(p))
}

/// Build the reviewer list for a set of project facts.
pub fn reviewers_for(facts: ProjectFacts) -> Vec<ReviewerConfig> {
    let mut reviewers = vec![
        ReviewerConfig::new("code-simplifier", "reviewers/code-simplifier", ReviewerLevel::Blocking),
        ReviewerConfig::new("repo-structure", "reviewers/repo-structure", ReviewerLevel::Warning),
    ];

    if facts.python_files {
        reviewers.push(
            ReviewerConfig::new("python-code", "reviewers/language/python", ReviewerLevel::Blocking)
                .with_languages(["python"]),
        );
    }

    if facts.bicep_files {
        reviewers.push(
            ReviewerConfig::new("bicep", "reviewers/language/bicep", ReviewerLevel::Blocking)
                .with_languages(["bicep"]),
        );
    }

    if facts.ci_workflows {
        reviewers.push(ReviewerConfig::new(
            "github-actions",
            "reviewers/github-actions",
            ReviewerLevel::Warning,
        ));
    }

    if facts.test_files {
        reviewers.push(ReviewerConfig::new(
            "test-quality",
            "reviewers/test-quality",
            ReviewerLevel::Blocking,
        ));
    }

    if facts.changelog {
        reviewers.push(ReviewerConfig::new("release", "reviewers/release", ReviewerLevel::Blocking));
    }

    reviewers
}

/// Detect which reviewers should be configured for a project.
pub fn detect_reviewers(project_root: &Path) -> Vec<ReviewerConfig> {
    ReviewerDetector::new(project_root).detect()
}

/// Human-readable reason a reviewer was proposed.
pub fn detection_reason(reviewer_name: &str) -> &'static str {
    match reviewer_name {
        "code-simplifier" | "repo-structure" => "universal reviewer (included for all projects)",
        "python-code" => "found .py files",
        "bicep" => "found .bicep files",
        "github-actions" => "found .github/workflows/*.yml files",
        "test-quality" => "found test files",
        "release" => "found CHANGELOG.md",
        _ => "detected in project",
    }
}

/// Detected reviewer names that the configured list does not include, sorted.
pub fn suggest_missing(configured: &[ReviewerConfig], detected: &[ReviewerConfig]) -> Vec<String> {
    let mut missing: Vec<String> = detected
        .iter()
        .filter(|d| !configured.iter().any(|c| c.name == d.name))
        .map(|d| d.name.clone())
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(reviewers: &[ReviewerConfig]) -> Vec<&str> {
        reviewers.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_project_returns_only_universal() {
        let temp = tempdir().unwrap();
        let reviewers = detect_reviewers(temp.path());

        assert_eq!(names(&reviewers), vec!["code-simplifier", "repo-structure"]);
        assert_eq!(reviewers[0].skill, "reviewers/code-simplifier");
        assert_eq!(reviewers[1].level, ReviewerLevel::Warning);
    }

    #[test]
    fn test_detects_python_in_subdirectory() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src").join("app.py"), "def main(): pass\n").unwrap();

        let reviewers = detect_reviewers(temp.path());
        let python = reviewers.iter().find(|r| r.name == "python-code").unwrap();
        assert_eq!(python.languages, Some(vec!["python".to_string()]));
    }

    #[test]
    fn test_ignored_directories_are_skipped() {
        let temp = tempdir().unwrap();
        let venv = temp.path().join(".venv").join("lib");
        fs::create_dir_all(&venv).unwrap();
        fs::write(venv.join("site.py"), "").unwrap();

        assert!(!ReviewerDetector::new(temp.path()).scan().python_files);
    }

    #[test]
    fn test_no_github_actions_with_empty_workflows_dir() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join(".github").join("workflows")).unwrap();

        assert!(!ReviewerDetector::new(temp.path()).scan().ci_workflows);
    }

    #[test]
    fn test_detects_github_actions_yaml() {
        let temp = tempdir().unwrap();
        let workflows = temp.path().join(".github").join("workflows");
        fs::create_dir_all(&workflows).unwrap();
        fs::write(workflows.join("deploy.yaml"), "name: Deploy\n").unwrap();

        assert!(names(&detect_reviewers(temp.path())).contains(&"github-actions"));
    }

    #[test]
    fn test_test_file_conventions() {
        assert!(is_test_file("test_main.py"));
        assert!(is_test_file("main_test.py"));
        assert!(is_test_file("handler_test.go"));
        assert!(is_test_file("app.test.ts"));
        assert!(is_test_file("widget.spec.js"));
        assert!(!is_test_file("main.py"));
        assert!(!is_test_file("contest.py"));
        assert!(!is_test_file("latest.go"));
    }

    #[test]
    fn test_fixed_order_for_all_facts() {
        let facts = ProjectFacts {
            python_files: true,
            bicep_files: true,
            ci_workflows: true,
            test_files: true,
            changelog: true,
        };

        assert_eq!(
            names(&reviewers_for(facts)),
            vec![
                "code-simplifier",
                "repo-structure",
                "python-code",
                "bicep",
                "github-actions",
                "test-quality",
                "release"
            ]
        );
    }

    #[test]
    fn test_suggest_missing() {
        let configured = vec![ReviewerConfig::new("release", "r", ReviewerLevel::Blocking)];
        let detected = reviewers_for(ProjectFacts { changelog: true, ..ProjectFacts::default() });

        assert_eq!(suggest_missing(&configured, &detected), vec!["code-simplifier", "repo-structure"]);
    }

    #[test]
    fn test_detection_reason() {
        assert_eq!(detection_reason("release"), "found CHANGELOG.md");
        assert_eq!(detection_reason("custom"), "detected in project");
    }
}
