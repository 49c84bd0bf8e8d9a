//! Persistent review progress.
//!
//! A review run records which reviewers have finished so an interrupted
//! run can pick up where it stopped. The state carries a fingerprint of
//! the reviewer configuration that started it; a state whose fingerprint
//! no longer matches the current configuration is stale and discarded.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ReviewerConfig;
use crate::document::write_file_atomic;
use crate::error::{RalphError, RalphResult};

/// Compute a deterministic fingerprint of a reviewer configuration.
///
/// Covers each reviewer's name, skill, level, and sorted language tags, in
/// list order. Reordering reviewers changes the hash; reordering the
/// languages of one reviewer does not.
pub fn compute_config_hash(reviewers: &[ReviewerConfig]) -> String {
    let entries: Vec<serde_json::Value> = reviewers
        .iter()
        .map(|r| {
            let languages = r.restricted_languages().map(|langs| {
                let mut sorted = langs.to_vec();
                sorted.sort();
                sorted
            });
            serde_json::json!({
                "name": r.name,
                "skill": r.skill,
                "level": r.level.as_str(),
                "languages": languages,
            })
        })
        .collect();

    // Object keys serialize sorted and compact, so the encoding is canonical.
    let serialized = serde_json::Value::Array(entries).to_string();

    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether persisted progress was produced by a different configuration.
pub fn is_stale(persisted: &ReviewState, current_hash: &str) -> bool {
    persisted.config_hash != current_hash
}

/// Where a run stands relative to the state on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStatus {
    /// No usable state file.
    Absent,
    /// State matches the current configuration and can be resumed.
    Active,
    /// State was produced by a different configuration.
    Stale,
}

impl StateStatus {
    /// Classify persisted state against the current configuration hash.
    pub fn of(persisted: Option<&ReviewState>, current_hash: &str) -> Self {
        match persisted {
            None => Self::Absent,
            Some(state) if is_stale(state, current_hash) => Self::Stale,
            Some(_) => Self::Active,
        }
    }
}

impl fmt::Display for StateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Active => "active",
            Self::Stale => "stale",
        })
    }
}

/// Persistent state for a review run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Configured reviewer names for this run, in evaluation order
    pub reviewer_names: Vec<String>,

    /// Reviewer name to pass/fail, in completion order
    #[serde(default, with = "completion_map")]
    completed: Vec<(String, bool)>,

    /// RFC 3339 time of the last update
    pub timestamp: String,

    /// Fingerprint of the configuration that started the run
    pub config_hash: String,
}

impl ReviewState {
    /// Start a fresh run for the given reviewers.
    pub fn new(reviewers: &[ReviewerConfig]) -> Self {
        Self {
            reviewer_names: reviewers.iter().map(|r| r.name.clone()).collect(),
            completed: Vec::new(),
            timestamp: now_timestamp(),
            config_hash: compute_config_hash(reviewers),
        }
    }

    /// Record a reviewer's result.
    ///
    /// Re-recording a reviewer updates its result without changing its
    /// position in completion order.
    pub fn mark_completed(&mut self, name: &str, passed: bool) -> RalphResult<()> {
        if !self.reviewer_names.iter().any(|n| n == name) {
            return Err(RalphError::UnknownReviewer(name.to_string()));
        }

        match self.completed.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = passed,
            None => self.completed.push((name.to_string(), passed)),
        }
        self.timestamp = now_timestamp();
        Ok(())
    }

    /// Result for a reviewer, if it has completed.
    pub fn result(&self, name: &str) -> Option<bool> {
        self.completed.iter().find(|(n, _)| n == name).map(|(_, passed)| *passed)
    }

    /// Whether a reviewer has completed.
    pub fn is_completed(&self, name: &str) -> bool {
        self.result(name).is_some()
    }

    /// Completed reviewers and their results, in completion order.
    pub fn completed(&self) -> impl Iterator<Item = (&str, bool)> {
        self.completed.iter().map(|(n, passed)| (n.as_str(), *passed))
    }

    /// Reviewers that have not completed, in evaluation order.
    pub fn pending(&self) -> Vec<&str> {
        self.reviewer_names
            .iter()
            .filter(|n| !self.is_completed(n))
            .map(String::as_str)
            .collect()
    }

    /// Whether every configured reviewer has completed.
    pub fn is_finished(&self) -> bool {
        self.pending().is_empty()
    }

    /// Every recorded key belongs to the configured reviewer set.
    fn is_consistent(&self) -> bool {
        self.completed.iter().all(|(n, _)| self.reviewer_names.contains(n))
    }

    /// Save the state, replacing any previous file.
    pub fn save(&self, path: &Path) -> RalphResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_file_atomic(path, &format!("{content}\n"))?;
        tracing::debug!(path = ?path, completed = self.completed.len(), "Saved review state");
        Ok(())
    }

    /// Load state from disk.
    ///
    /// A missing, unreadable-as-JSON, or inconsistent file yields `None`.
    /// Other I/O failures are returned.
    pub fn load(path: &Path) -> RalphResult<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(path = ?path, "Review state is not UTF-8, ignoring");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(state) if state.is_consistent() => Ok(Some(state)),
            Ok(_) => {
                tracing::warn!(path = ?path, "Review state lists unknown reviewers, ignoring");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Corrupt review state, ignoring");
                Ok(None)
            }
        }
    }

    /// Remove the state file. Missing files are not an error.
    pub fn clear(path: &Path) -> RalphResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resume matching progress from disk, or start fresh.
    ///
    /// With `force`, persisted progress is always discarded.
    pub fn resume_or_start(
        path: &Path,
        reviewers: &[ReviewerConfig],
        force: bool,
    ) -> RalphResult<(Self, StateStatus)> {
        let current_hash = compute_config_hash(reviewers);
        let persisted = Self::load(path)?;
        let status = StateStatus::of(persisted.as_ref(), &current_hash);

        match persisted {
            Some(state) if status == StateStatus::Active && !force => {
                tracing::info!(
                    completed = state.completed.len(),
                    pending = state.pending().len(),
                    "Resuming review run"
                );
                Ok((state, status))
            }
            _ => {
                if status == StateStatus::Stale {
                    tracing::info!("Reviewer configuration changed, starting a fresh review run");
                }
                Ok((Self::new(reviewers), status))
            }
        }
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Serialize `Vec<(String, bool)>` as a JSON object, keeping entry order.
mod completion_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(entries: &[(String, bool)], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (name, passed) in entries {
            map.serialize_entry(name, passed)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, bool)>, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Vec<(String, bool)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of reviewer name to pass/fail")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, bool)> = Vec::new();
                while let Some((name, passed)) = access.next_entry::<String, bool>()? {
                    match entries.iter_mut().find(|(n, _)| *n == name) {
                        Some(entry) => entry.1 = passed,
                        None => entries.push((name, passed)),
                    }
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
