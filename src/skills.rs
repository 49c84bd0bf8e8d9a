//! Reviewer skill resolution.
//!
//! A reviewer's `skill` field names a directory under the skills root that
//! holds a `SKILL.md` instruction file.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{RalphError, RalphResult};

/// Instruction file expected inside every skill directory.
pub const SKILL_FILENAME: &str = "SKILL.md";

/// Loads skill instructions from a skills directory.
#[derive(Debug, Clone)]
pub struct SkillLoader {
    skills_dir: PathBuf,
}

impl SkillLoader {
    /// Create a loader rooted at `skills_dir`.
    pub fn new(skills_dir: impl Into<PathBuf>) -> Self {
        Self { skills_dir: skills_dir.into() }
    }

    /// Root directory this loader reads from.
    pub fn skills_dir(&self) -> &Path {
        &self.skills_dir
    }

    /// Path where the instructions for `skill` are expected.
    pub fn skill_path(&self, skill: &str) -> PathBuf {
        self.skills_dir.join(skill).join(SKILL_FILENAME)
    }

    /// Whether `skill` resolves to an instruction file.
    pub fn exists(&self, skill: &str) -> bool {
        self.skill_path(skill).is_file()
    }

    /// Read the instructions for `skill`.
    pub fn load(&self, skill: &str) -> RalphResult<String> {
        let path = self.skill_path(skill);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RalphError::SkillNotFound { skill: skill.to_string(), path })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every skill reference under the root, sorted, using `/` separators.
    pub fn discover(&self) -> Vec<String> {
        let mut skills: Vec<String> = WalkDir::new(&self.skills_dir)
            .min_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && e.file_name() == SKILL_FILENAME)
            .filter_map(|e| {
                let dir = e.path().parent()?.strip_prefix(&self.skills_dir).ok()?;
                let parts: Vec<_> = dir.components().map(|c| c.as_os_str().to_string_lossy()).collect();
                Some(parts.join("/"))
            })
            .collect();
        skills.sort();
        skills
    }
}
