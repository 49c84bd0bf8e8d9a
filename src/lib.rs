//! # Ralph
//!
//! Core of a multi-reviewer code review pipeline.
//!
//! Ralph reads reviewer and quality check configuration from marker blocks
//! in a project's guidance document, proposes reviewers from project
//! contents, keeps that configuration block up to date without disturbing
//! the rest of the document, tracks review progress across interrupted
//! runs, and turns free-form reviewer output into structured findings.
//!
//! ## Quick Start
//!
//! ```bash
//! # Propose reviewers for the current project and write them to CLAUDE.md
//! ralph reviewers write
//!
//! # Parse a reviewer's output
//! ralph parse-review review.md --format json
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::case_sensitive_file_extension_comparisons)]

pub mod config;
pub mod detect;
pub mod document;
pub mod error;
pub mod manifest;
pub mod review;
pub mod skills;

use std::path::Path;

pub use config::{
    extract_quality_checks, extract_reviewer_config, QualityCheck, ReviewerConfig, ReviewerLevel,
    Settings,
};
pub use detect::{detect_languages, detect_reviewers, Language};
pub use document::write_reviewer_config;
pub use error::{RalphError, RalphResult};
pub use manifest::{load_manifest, save_manifest, Manifest};
pub use review::{
    compute_config_hash, is_stale, parse_review_output, Finding, ReviewOutput, ReviewState,
    StateStatus, Verdict,
};
pub use skills::SkillLoader;

/// Load persisted review state. `Ok(None)` when absent or unusable.
pub fn load_review_state(path: &Path) -> RalphResult<Option<ReviewState>> {
    ReviewState::load(path)
}

/// Persist review state, replacing the previous file.
pub fn save_review_state(path: &Path, state: &ReviewState) -> RalphResult<()> {
    state.save(path)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "ralph";
