//! Reviewer and quality check schema definitions.
//!
//! Defines the YAML structure of the fenced blocks embedded in the
//! project guidance document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity level for a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewerLevel {
    /// Failures must be fixed before progress continues.
    Blocking,
    /// Issues are reported but do not gate progress.
    Warning,
    /// Advisory feedback only.
    Suggestion,
}

impl ReviewerLevel {
    /// Get the wire name of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Warning => "warning",
            Self::Suggestion => "suggestion",
        }
    }

    /// Whether a failure at this level gates progress.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocking)
    }
}

impl fmt::Display for ReviewerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single code reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// Display name, unique within a configuration
    pub name: String,

    /// Skill path to invoke for this reviewer
    pub skill: String,

    /// Severity level
    pub level: ReviewerLevel,

    /// Languages this reviewer applies to (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

impl ReviewerConfig {
    /// Create a reviewer that applies to every language.
    pub fn new(name: impl Into<String>, skill: impl Into<String>, level: ReviewerLevel) -> Self {
        Self { name: name.into(), skill: skill.into(), level, languages: None }
    }

    /// Restrict the reviewer to the given languages.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let languages: Vec<String> = languages.into_iter().map(Into::into).collect();
        self.languages = if languages.is_empty() { None } else { Some(languages) };
        self
    }

    /// Language tags this reviewer is restricted to, if any.
    ///
    /// An empty list is treated the same as no restriction.
    pub fn restricted_languages(&self) -> Option<&[String]> {
        self.languages.as_deref().filter(|langs| !langs.is_empty())
    }
}

/// A single quality check definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    /// Name of the check (e.g., "typecheck")
    pub name: String,

    /// Shell command to run for this check
    pub command: String,

    /// Whether this check must pass for success
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl QualityCheck {
    /// Create a required quality check.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self { name: name.into(), command: command.into(), required: true }
    }

    /// Mark the check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// The `reviewers:` document inside a RALPH:REVIEWERS block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ReviewersBlock {
    #[serde(default)]
    pub reviewers: Vec<ReviewerConfig>,
}

/// The `checks:` document inside a RALPH:CHECKS block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ChecksBlock {
    #[serde(default)]
    pub checks: Vec<QualityCheck>,
}

/// The built-in reviewer set used when no usable configuration is declared.
pub fn default_reviewers() -> Vec<ReviewerConfig> {
    vec![
        ReviewerConfig::new("test-quality", "reviewers/test-quality", ReviewerLevel::Blocking),
        ReviewerConfig::new("code-simplifier", "reviewers/code-simplifier", ReviewerLevel::Blocking),
        ReviewerConfig::new("python-code", "reviewers/language/python", ReviewerLevel::Blocking)
            .with_languages(["python"]),
        ReviewerConfig::new("github-actions", "reviewers/github-actions", ReviewerLevel::Warning),
        ReviewerConfig::new("repo-structure", "reviewers/repo-structure", ReviewerLevel::Warning),
        ReviewerConfig::new("release", "reviewers/release", ReviewerLevel::Blocking),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reviewers() {
        let reviewers = default_reviewers();
        assert_eq!(reviewers.len(), 6);

        let find = |name: &str| reviewers.iter().find(|r| r.name == name).unwrap();

        assert_eq!(find("python-code").languages, Some(vec!["python".to_string()]));
        assert_eq!(find("test-quality").level, ReviewerLevel::Blocking);
        assert_eq!(find("github-actions").level, ReviewerLevel::Warning);
        assert!(find("release").languages.is_none());
    }

    #[test]
    fn test_parse_reviewer_yaml() {
        let yaml = r"
name: python-code
skill: reviewers/language/python
level: blocking
languages: [python, go]
";

        let reviewer: ReviewerConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(reviewer.name, "python-code");
        assert_eq!(reviewer.level, ReviewerLevel::Blocking);
        assert_eq!(reviewer.restricted_languages().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_level_fails() {
        let yaml = "name: x\nskill: y\nlevel: critical\n";
        assert!(serde_yaml::from_str::<ReviewerConfig>(yaml).is_err());
    }

    #[test]
    fn test_quality_check_required_defaults_true() {
        let check: QualityCheck = serde_yaml::from_str("name: test\ncommand: cargo test\n").unwrap();
        assert!(check.required);

        let check: QualityCheck =
            serde_yaml::from_str("name: fmt\ncommand: cargo fmt --check\nrequired: false\n")
                .unwrap();
        assert!(!check.required);
    }

    #[test]
    fn test_empty_languages_is_unrestricted() {
        let reviewer = ReviewerConfig::new("a", "b", ReviewerLevel::Warning).with_languages(Vec::<String>::new());
        assert!(reviewer.languages.is_none());

        let mut reviewer = ReviewerConfig::new("a", "b", ReviewerLevel::Warning);
        reviewer.languages = Some(Vec::new());
        assert!(reviewer.restricted_languages().is_none());
    }

    #[test]
    fn test_level_display() {
        assert_eq!(ReviewerLevel::Suggestion.to_string(), "suggestion");
        assert!(ReviewerLevel::Blocking.is_blocking());
        assert!(!ReviewerLevel::Warning.is_blocking());
    }
}
