//! Guidance document editing.
//!
//! Writes the RALPH:REVIEWERS region into a markdown document while keeping
//! every byte outside that region unchanged. Writing the same reviewer list
//! twice produces identical output.

mod splice;

pub use splice::{find_heading, Splice};

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{find_region, BlockKind, ReviewerConfig};
use crate::error::RalphResult;

/// Heading that project overrides live under. Generated configuration goes before it.
pub const PROJECT_SPECIFIC_HEADING: &str = "## Project-Specific Instructions";

/// Heading of the section created around a newly inserted reviewer region.
pub const REVIEWERS_HEADING: &str = "## Reviewers";

/// Start marker through end marker, fenced or not.
static LOOSE_REVIEWERS_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--\s*RALPH:REVIEWERS:START\s*-->.*?<!--\s*RALPH:REVIEWERS:END\s*-->")
        .expect("marker pattern is valid")
});

/// Render a YAML scalar, quoting it when a plain scalar would not read back verbatim.
fn yaml_scalar(value: &str) -> String {
    let plain_chars = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '@' | '+' | ' '));
    let plain_shape = !value.is_empty()
        && plain_chars
        && !value.starts_with(['-', ' ', '.'])
        && !value.ends_with(' ');

    if plain_shape {
        if let Ok(serde_yaml::Value::String(parsed)) = serde_yaml::from_str(value) {
            if parsed == value {
                return value.to_string();
            }
        }
    }

    // A JSON string literal is a valid YAML double-quoted scalar.
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Render the complete marker-delimited reviewer region.
///
/// Field order per entry is fixed: name, skill, languages (when
/// restricted), level.
pub fn render_reviewer_block(reviewers: &[ReviewerConfig]) -> String {
    let mut yaml = String::new();

    if reviewers.is_empty() {
        yaml.push_str("reviewers: []\n");
    } else {
        yaml.push_str("reviewers:\n");
        for reviewer in reviewers {
            yaml.push_str(&format!("  - name: {}\n", yaml_scalar(&reviewer.name)));
            yaml.push_str(&format!("    skill: {}\n", yaml_scalar(&reviewer.skill)));
            if let Some(languages) = reviewer.restricted_languages() {
                let langs: Vec<String> = languages.iter().map(|l| yaml_scalar(l)).collect();
                yaml.push_str(&format!("    languages: [{}]\n", langs.join(", ")));
            }
            yaml.push_str(&format!("    level: {}\n", reviewer.level));
        }
    }

    format!(
        "{}\n```yaml\n{}```\n{}",
        BlockKind::Reviewers.start_marker(),
        yaml,
        BlockKind::Reviewers.end_marker()
    )
}

/// Compute the new document text for a reviewer list.
///
/// `existing` is the current document content, or `None` when the document
/// does not exist yet.
pub fn apply_reviewer_config(existing: Option<&str>, reviewers: &[ReviewerConfig]) -> String {
    let block = render_reviewer_block(reviewers);

    let Some(content) = existing else {
        return format!("{REVIEWERS_HEADING}\n\n{block}\n");
    };

    if let Some(found) = LOOSE_REVIEWERS_SPAN.find(content) {
        return Splice::replace(found.range(), block).apply(content);
    }

    let section = format!("\n{REVIEWERS_HEADING}\n\n{block}\n");

    if let Some(at) = find_heading(content, PROJECT_SPECIFIC_HEADING) {
        return Splice::insert(at, format!("{section}\n")).apply(content);
    }

    let kept = content.trim_end().len();
    Splice::replace(kept..content.len(), format!("\n{section}")).apply(content)
}

/// Write or update the RALPH:REVIEWERS region of a document.
///
/// Creates the document when missing. Replaces an existing region in
/// place; otherwise inserts a new section before the project-specific
/// instructions heading, or at the end of the document.
pub fn write_reviewer_config(path: &Path, reviewers: &[ReviewerConfig]) -> RalphResult<()> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let updated = apply_reviewer_config(existing.as_deref(), reviewers);
    if existing.as_deref() == Some(updated.as_str()) {
        tracing::debug!(path = ?path, "Reviewer configuration already up to date");
        return Ok(());
    }

    write_file_atomic(path, &updated)?;
    tracing::info!(path = ?path, count = reviewers.len(), "Wrote reviewer configuration");
    Ok(())
}

/// Check whether a document contains a well-formed RALPH:REVIEWERS region.
pub fn has_reviewer_config(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|content| find_region(&content, BlockKind::Reviewers).is_some())
}

/// Ensure `.gitignore` in `project_root` lists `entry` on its own line.
///
/// Creates the file when missing and never duplicates the entry.
pub fn ensure_gitignore_entry(project_root: &Path, entry: &str) -> RalphResult<PathBuf> {
    let path = project_root.join(".gitignore");

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    if content.lines().any(|line| line.trim() == entry) {
        return Ok(path);
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(entry);
    updated.push('\n');

    write_file_atomic(&path, &updated)?;
    tracing::debug!(path = ?path, entry, "Added ignore entry");
    Ok(path)
}

/// Write a file atomically (write to temp, then rename).
pub(crate) fn write_file_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let temp_path = path.with_file_name(format!("{file_name}.tmp"));

    fs::write(&temp_path, content)?;

    // Rename to final location (atomic on most systems)
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}
