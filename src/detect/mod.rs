//! Project inspection.
//!
//! Proposes a reviewer set and reports project languages when the guidance
//! document declares nothing usable.

mod language;
mod reviewers;

pub use language::{detect_languages, Language, LanguageDetector};
pub use reviewers::{
    detect_reviewers, detection_reason, reviewers_for, suggest_missing, ProjectFacts,
    ReviewerDetector,
};

use std::path::Path;

use crate::config::{declared_reviewers, ReviewerConfig};

/// Resolve the reviewer set for a run.
///
/// Uses the reviewers declared in the document when it declares a non-empty,
/// valid list; otherwise proposes one from the project contents.
pub fn resolve_reviewers(document: Option<&str>, project_root: &Path) -> Vec<ReviewerConfig> {
    if let Some(reviewers) = document.and_then(declared_reviewers) {
        return reviewers;
    }

    tracing::debug!(path = ?project_root, "No declared reviewers, detecting from project");
    detect_reviewers(project_root)
}
