//! Reviewer and quality check configuration.
//!
//! Configuration lives in fenced YAML blocks inside the project guidance
//! document, delimited by RALPH markers. Tool settings (file locations,
//! scan options) live separately in `.ralph.toml`.

mod extract;
mod schema;
mod settings;

pub use extract::{
    declared_reviewers, decode_quality_checks, decode_reviewers, extract_quality_checks,
    extract_reviewer_config, find_region, load_quality_checks, load_reviewer_configs, BlockKind,
    Extracted, Region,
};
pub use schema::{default_reviewers, QualityCheck, ReviewerConfig, ReviewerLevel};
pub use settings::{
    DetectionSettings, Settings, DEFAULT_DOCUMENT, LOCAL_SETTINGS_FILENAME, MANIFEST_FILENAME,
    REVIEW_STATE_FILENAME,
};
