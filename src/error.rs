//! Error types for Ralph operations.
//!
//! Malformed configuration, state, and review text never reach this type:
//! those inputs degrade to defaults at their boundary. What remains is the
//! misconfiguration class (a referenced skill or reviewer does not exist)
//! and underlying I/O or encoding failures.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for Ralph operations.
pub type RalphResult<T> = Result<T, RalphError>;

/// Errors that can occur in Ralph operations.
#[derive(Debug, Error)]
pub enum RalphError {
    /// A reviewer skill reference could not be resolved.
    #[error("Skill '{skill}' not found. Expected at: {}", path.display())]
    SkillNotFound { skill: String, path: PathBuf },

    /// A reviewer name is not part of the configured reviewer set.
    #[error("Reviewer '{0}' is not part of this review run")]
    UnknownReviewer(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RalphError {
    /// Whether this error points at a user misconfiguration rather than I/O.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SkillNotFound { .. } | Self::UnknownReviewer(_))
    }
}
