//! Marker-delimited configuration extraction.
//!
//! Locates a `<!-- RALPH:<KIND>:START -->` / `<!-- RALPH:<KIND>:END -->`
//! region wrapping a fenced YAML block, decodes the payload, and validates
//! it. Every failure degrades to a fallback value: the document is
//! hand-edited and must never stop a run.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use super::schema::{default_reviewers, ChecksBlock, QualityCheck, ReviewerConfig, ReviewersBlock};
use crate::error::RalphResult;

static REVIEWERS_PATTERN: Lazy<Regex> = Lazy::new(|| block_pattern("REVIEWERS"));
static CHECKS_PATTERN: Lazy<Regex> = Lazy::new(|| block_pattern("CHECKS"));

fn block_pattern(kind: &str) -> Regex {
    let pattern = format!(
        r"(?s)<!--\s*RALPH:{kind}:START\s*-->\s*```(?:ya?ml)?[ \t]*\r?\n(.*?)```[ \t]*\r?\n?\s*<!--\s*RALPH:{kind}:END\s*-->"
    );
    Regex::new(&pattern).expect("block pattern is valid")
}

/// The kinds of configuration block a document can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `RALPH:REVIEWERS`
    Reviewers,
    /// `RALPH:CHECKS`
    Checks,
}

impl BlockKind {
    /// Opening marker line.
    pub fn start_marker(&self) -> &'static str {
        match self {
            Self::Reviewers => "<!-- RALPH:REVIEWERS:START -->",
            Self::Checks => "<!-- RALPH:CHECKS:START -->",
        }
    }

    /// Closing marker line.
    pub fn end_marker(&self) -> &'static str {
        match self {
            Self::Reviewers => "<!-- RALPH:REVIEWERS:END -->",
            Self::Checks => "<!-- RALPH:CHECKS:END -->",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Reviewers => &REVIEWERS_PATTERN,
            Self::Checks => &CHECKS_PATTERN,
        }
    }
}

/// A located configuration region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Byte span from the start marker through the end marker, inclusive.
    pub span: Range<usize>,
    /// Byte span of the YAML payload inside the fence.
    pub payload: Range<usize>,
}

/// Find the first well-formed region of the given kind.
pub fn find_region(text: &str, kind: BlockKind) -> Option<Region> {
    let caps = kind.pattern().captures(text)?;
    let whole = caps.get(0)?;
    let payload = caps.get(1)?;
    Some(Region { span: whole.range(), payload: payload.range() })
}

/// Outcome of decoding a configuration block.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    /// No region of this kind is present.
    Missing,
    /// A region is present but unusable.
    Malformed(String),
    /// The region decoded and validated.
    Parsed(T),
}

impl<T> Extracted<T> {
    /// Take the parsed value, if any.
    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Missing | Self::Malformed(_) => None,
        }
    }
}

fn decode_block<T: DeserializeOwned>(text: &str, kind: BlockKind) -> Extracted<T> {
    let Some(region) = find_region(text, kind) else {
        return Extracted::Missing;
    };

    let payload = &text[region.payload];
    let value: serde_yaml::Value = match serde_yaml::from_str(payload) {
        Ok(value) => value,
        Err(e) => return Extracted::Malformed(format!("invalid YAML: {e}")),
    };

    if !value.is_mapping() {
        return Extracted::Malformed("top level is not a mapping".to_string());
    }

    match serde_yaml::from_value(value) {
        Ok(block) => Extracted::Parsed(block),
        Err(e) => Extracted::Malformed(format!("schema mismatch: {e}")),
    }
}

fn check_unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err("entry has an empty name".to_string());
        }
        if !seen.insert(name) {
            return Err(format!("duplicate name '{name}'"));
        }
    }
    Ok(())
}

/// Decode and validate the reviewer block without applying any fallback.
pub fn decode_reviewers(text: &str) -> Extracted<Vec<ReviewerConfig>> {
    match decode_block::<ReviewersBlock>(text, BlockKind::Reviewers) {
        Extracted::Parsed(block) => {
            if let Err(reason) = check_unique_names(block.reviewers.iter().map(|r| r.name.as_str()))
            {
                return Extracted::Malformed(reason);
            }
            let reviewers = block
                .reviewers
                .into_iter()
                .map(|mut r| {
                    if r.languages.as_ref().is_some_and(Vec::is_empty) {
                        r.languages = None;
                    }
                    r
                })
                .collect();
            Extracted::Parsed(reviewers)
        }
        Extracted::Missing => Extracted::Missing,
        Extracted::Malformed(reason) => Extracted::Malformed(reason),
    }
}

/// Decode and validate the quality check block without applying any fallback.
pub fn decode_quality_checks(text: &str) -> Extracted<Vec<QualityCheck>> {
    match decode_block::<ChecksBlock>(text, BlockKind::Checks) {
        Extracted::Parsed(block) => {
            if let Err(reason) = check_unique_names(block.checks.iter().map(|c| c.name.as_str())) {
                return Extracted::Malformed(reason);
            }
            if let Some(check) = block.checks.iter().find(|c| c.command.trim().is_empty()) {
                return Extracted::Malformed(format!("check '{}' has no command", check.name));
            }
            Extracted::Parsed(block.checks)
        }
        Extracted::Missing => Extracted::Missing,
        Extracted::Malformed(reason) => Extracted::Malformed(reason),
    }
}

/// The explicitly declared reviewer list, if the document declares a usable one.
///
/// Returns `None` when the block is absent, malformed, or empty.
pub fn declared_reviewers(text: &str) -> Option<Vec<ReviewerConfig>> {
    decode_reviewers(text).parsed().filter(|reviewers| !reviewers.is_empty())
}

/// Extract reviewer configuration from document text.
///
/// Falls back to [`default_reviewers`] when the markers are missing, the
/// block is malformed, or it declares no reviewers.
pub fn extract_reviewer_config(text: &str) -> Vec<ReviewerConfig> {
    match decode_reviewers(text) {
        Extracted::Parsed(reviewers) if !reviewers.is_empty() => reviewers,
        Extracted::Parsed(_) => {
            tracing::debug!("Reviewer block is empty, using default reviewers");
            default_reviewers()
        }
        Extracted::Missing => default_reviewers(),
        Extracted::Malformed(reason) => {
            tracing::warn!(reason = %reason, "Ignoring malformed reviewer configuration");
            default_reviewers()
        }
    }
}

/// Extract quality checks from document text.
///
/// An absent, empty, or malformed block yields no checks.
pub fn extract_quality_checks(text: &str) -> Vec<QualityCheck> {
    match decode_quality_checks(text) {
        Extracted::Parsed(checks) => checks,
        Extracted::Missing => Vec::new(),
        Extracted::Malformed(reason) => {
            tracing::warn!(reason = %reason, "Ignoring malformed quality check configuration");
            Vec::new()
        }
    }
}

fn read_document(path: &Path) -> RalphResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load reviewer configuration from a document on disk.
///
/// A missing document yields the default reviewers.
pub fn load_reviewer_configs(path: &Path) -> RalphResult<Vec<ReviewerConfig>> {
    Ok(match read_document(path)? {
        Some(content) => extract_reviewer_config(&content),
        None => default_reviewers(),
    })
}

/// Load quality checks from a document on disk.
///
/// A missing document yields no checks.
pub fn load_quality_checks(path: &Path) -> RalphResult<Vec<QualityCheck>> {
    Ok(match read_document(path)? {
        Some(content) => extract_quality_checks(&content),
        None => Vec::new(),
    })
}
