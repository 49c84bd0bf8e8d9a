//! Reviewer applicability and enforcement.

use std::collections::BTreeSet;

use crate::config::{ReviewerConfig, ReviewerLevel};
use crate::detect::Language;

/// Whether a reviewer applies to a project with the given languages.
///
/// Unrestricted reviewers always run. Restricted reviewers run when any of
/// their language tags matches a detected language.
pub fn should_run(reviewer: &ReviewerConfig, detected: &BTreeSet<Language>) -> bool {
    match reviewer.restricted_languages() {
        None => true,
        Some(tags) => tags
            .iter()
            .any(|tag| detected.iter().any(|lang| lang.tag().eq_ignore_ascii_case(tag.trim()))),
    }
}

/// Whether a failed review from this reviewer gates progress.
pub fn is_enforced(reviewer: &ReviewerConfig, strict: bool) -> bool {
    match reviewer.level {
        ReviewerLevel::Blocking => true,
        ReviewerLevel::Warning => strict,
        ReviewerLevel::Suggestion => false,
    }
}

/// Reviewers applicable to the detected languages, in evaluation order.
pub fn applicable<'a>(
    reviewers: &'a [ReviewerConfig],
    detected: &BTreeSet<Language>,
) -> Vec<&'a ReviewerConfig> {
    reviewers.iter().filter(|r| should_run(r, detected)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(list: &[Language]) -> BTreeSet<Language> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_unrestricted_always_runs() {
        let reviewer = ReviewerConfig::new("repo-structure", "reviewers/repo-structure", ReviewerLevel::Warning);
        assert!(should_run(&reviewer, &BTreeSet::new()));
    }

    #[test]
    fn test_empty_languages_treated_as_unrestricted() {
        let mut reviewer = ReviewerConfig::new("x", "reviewers/x", ReviewerLevel::Warning);
        reviewer.languages = Some(Vec::new());
        assert!(should_run(&reviewer, &BTreeSet::new()));
    }

    #[test]
    fn test_restricted_runs_on_match() {
        let reviewer = ReviewerConfig::new("python-code", "reviewers/language/python", ReviewerLevel::Blocking)
            .with_languages(["Python"]);

        assert!(should_run(&reviewer, &langs(&[Language::Rust, Language::Python])));
        assert!(!should_run(&reviewer, &langs(&[Language::Go])));
        assert!(!should_run(&reviewer, &BTreeSet::new()));
    }

    #[test]
    fn test_enforcement_levels() {
        let blocking = ReviewerConfig::new("a", "a", ReviewerLevel::Blocking);
        let warning = ReviewerConfig::new("b", "b", ReviewerLevel::Warning);
        let suggestion = ReviewerConfig::new("c", "c", ReviewerLevel::Suggestion);

        assert!(is_enforced(&blocking, false));
        assert!(is_enforced(&blocking, true));
        assert!(!is_enforced(&warning, false));
        assert!(is_enforced(&warning, true));
        assert!(!is_enforced(&suggestion, true));
    }

    #[test]
    fn test_applicable_keeps_order() {
        let reviewers = vec![
            ReviewerConfig::new("first", "a", ReviewerLevel::Blocking),
            ReviewerConfig::new("bicep", "b", ReviewerLevel::Blocking).with_languages(["bicep"]),
            ReviewerConfig::new("last", "c", ReviewerLevel::Warning),
        ];

        let names: Vec<_> = applicable(&reviewers, &langs(&[Language::Go]))
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "last"]);
    }
}
