//! Structured review findings.
//!
//! Reviewer output is free-form markdown carrying a verdict heading and,
//! for a failing review, a numbered list of findings:
//!
//! ```text
//! ### Verdict: NEEDS_WORK
//!
//! 1. **FINDING-001**: Type Safety - Missing return type annotation
//!    - File: src/services/claude.py:42
//!    - Issue: Function lacks return type annotation
//!    - Suggestion: Add `-> str` return type annotation
//! ```
//!
//! Parsing never fails. A malformed entry is dropped; the rest of the
//! document is still read.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static VERDICT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)###\s*Verdict:\s*(PASSED|NEEDS_WORK)").expect("verdict pattern is valid")
});

static ENTRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\.\s*\*\*([^*]+)\*\*:\s*(.*)$").expect("entry pattern is valid")
});

static FIELD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*-\s*(File|Issue|Suggestion):\s*(.*)$").expect("field pattern is valid")
});

/// Review verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The code passed review.
    Passed,
    /// The code has issues that need to be addressed.
    NeedsWork,
}

impl Verdict {
    /// Get the wire name of this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::NeedsWork => "NEEDS_WORK",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding from a code reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Reviewer-assigned identifier (e.g., FINDING-001)
    pub id: String,

    /// Category of the issue (e.g., "Type Safety")
    pub category: String,

    /// Path to the file containing the issue
    pub file_path: String,

    /// Line number where the issue occurs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,

    /// Description of the problem
    pub issue: String,

    /// Recommended fix
    pub suggestion: String,
}

/// Verdict plus findings from one reviewer invocation.
///
/// A passed review never carries findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOutput {
    verdict: Verdict,
    findings: Vec<Finding>,
}

impl ReviewOutput {
    /// A passing review.
    pub fn passed() -> Self {
        Self { verdict: Verdict::Passed, findings: Vec::new() }
    }

    /// A failing review with its findings.
    pub fn needs_work(findings: Vec<Finding>) -> Self {
        Self { verdict: Verdict::NeedsWork, findings }
    }

    /// The review verdict.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Findings in source order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Consume the output, returning its findings.
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    /// Whether the review passed.
    pub fn is_passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldName {
    File,
    Issue,
    Suggestion,
}

/// One classified line of reviewer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    /// `N. **ID**: heading`
    Entry { id: &'a str, heading: &'a str },
    /// `- File:` / `- Issue:` / `- Suggestion:`
    Field { name: FieldName, text: &'a str },
    /// Horizontal rule, closing `[Review` marker, or markdown heading.
    Boundary,
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(caps) = ENTRY_PATTERN.captures(line) {
        if let (Some(id), Some(heading)) = (caps.get(1), caps.get(2)) {
            return Line::Entry { id: id.as_str(), heading: heading.as_str() };
        }
    }

    if let Some(caps) = FIELD_PATTERN.captures(line) {
        if let (Some(name), Some(text)) = (caps.get(1), caps.get(2)) {
            let name = match name.as_str().to_ascii_lowercase().as_str() {
                "file" => FieldName::File,
                "issue" => FieldName::Issue,
                _ => FieldName::Suggestion,
            };
            return Line::Field { name, text: text.as_str() };
        }
    }

    let trimmed = line.trim();
    let is_rule = trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-');
    if is_rule || trimmed.starts_with("[Review") || is_section_heading(line) {
        return Line::Boundary;
    }

    Line::Text(line)
}

/// An unindented ATX heading such as `### Summary`.
///
/// Indented `#` lines are field continuations (code comments, attributes).
fn is_section_heading(line: &str) -> bool {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with([' ', '\t'])
}

/// Cursor over classified lines.
struct Cursor<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_blank(&mut self) {
        while matches!(self.lines.get(self.pos), Some(Line::Text(t)) if t.trim().is_empty()) {
            self.pos += 1;
        }
    }

    /// Consume `- <name>: text` plus its continuation lines.
    ///
    /// A field body ends at the next field, entry, or boundary.
    fn field(&mut self, expected: FieldName) -> Option<String> {
        self.skip_blank();
        let Some(Line::Field { name, text }) = self.lines.get(self.pos).copied() else {
            return None;
        };
        if name != expected {
            return None;
        }
        self.pos += 1;

        let mut body = vec![text.trim()];
        while let Some(Line::Text(t)) = self.lines.get(self.pos).copied() {
            body.push(t.trim());
            self.pos += 1;
        }

        let joined = body.join("\n");
        let value = joined.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Parse the entry whose header sits at the current position.
    fn entry(&mut self, id: &str, heading: &str) -> Option<Finding> {
        self.pos += 1;

        let location = self.field(FieldName::File)?;
        let issue = self.field(FieldName::Issue)?;
        let suggestion = self.field(FieldName::Suggestion)?;
        let (file_path, line_number) = split_location(&location);

        Some(Finding {
            id: id.trim().to_string(),
            category: category_of(heading),
            file_path,
            line_number,
            issue,
            suggestion,
        })
    }
}

/// Category is the part of the entry heading before the description dash.
fn category_of(heading: &str) -> String {
    let category = heading
        .split_once(" - ")
        .or_else(|| heading.split_once('-'))
        .map_or(heading, |(category, _)| category);
    category.trim().to_string()
}

/// Split `path/to/file.py:123` (or `path:line:column`) into a path and
/// optional line number.
fn split_location(location: &str) -> (String, Option<u32>) {
    let location = location.lines().next().unwrap_or_default().trim().trim_matches('`');
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if let Some((rest, last)) = location.rsplit_once(':').filter(|(_, n)| numeric(n)) {
        let (path, line) = match rest.rsplit_once(':').filter(|(_, n)| numeric(n)) {
            Some((path, line)) => (path, line),
            None => (rest, last),
        };
        if let Ok(number) = line.parse() {
            return (path.trim().to_string(), Some(number));
        }
    }

    (location.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FINDINGS: &str = r"
[Review] 2026-01-22 10:00 UTC - python-code (blocking)

### Verdict: NEEDS_WORK

### Findings

1. **FINDING-001**: Type Safety - Missing return type annotation
   - File: src/ralph/services/claude.py:42
   - Issue: Function lacks return type annotation
   - Suggestion: Add `-> str` return type annotation

2. **FINDING-002**: Code Quality - Unused import
   - File: src/ralph/utils/console.py:5
   - Issue: The import `typing` is not used
   - Suggestion: Remove the unused import

---
";

    #[test]
    fn test_parse_passed_verdict() {
        let text = "[Review] x\n\n### Verdict: PASSED\n\n### Findings\n\nNone\n\n---\n";
        let output = parse_review_output(text);

        assert_eq!(output.verdict(), Verdict::Passed);
        assert!(output.findings().is_empty());
    }

    #[test]
    fn test_parse_needs_work_with_findings() {
        let output = parse_review_output(TWO_FINDINGS);

        assert_eq!(output.verdict(), Verdict::NeedsWork);
        assert_eq!(output.findings().len(), 2);

        let first = &output.findings()[0];
        assert_eq!(first.id, "FINDING-001");
        assert_eq!(first.category, "Type Safety");
        assert_eq!(first.file_path, "src/ralph/services/claude.py");
        assert_eq!(first.line_number, Some(42));
        assert_eq!(first.issue, "Function lacks return type annotation");
        assert_eq!(first.suggestion, "Add `-> str` return type annotation");

        let second = &output.findings()[1];
        assert_eq!(second.id, "FINDING-002");
        assert_eq!(second.category, "Code Quality");
        assert_eq!(second.line_number, Some(5));
    }

    #[test]
    fn test_parse_no_line_number() {
        let text = "### Verdict: NEEDS_WORK\n\n1. **FINDING-001**: Documentation - Missing docstring\n   - File: src/ralph/cli.py\n   - Issue: Module lacks docstring\n   - Suggestion: Add a module-level docstring\n";
        let output = parse_review_output(text);

        assert_eq!(output.findings().len(), 1);
        assert_eq!(output.findings()[0].file_path, "src/ralph/cli.py");
        assert_eq!(output.findings()[0].line_number, None);
    }

    #[test]
    fn test_parse_verdict_case_insensitive() {
        assert_eq!(parse_review_output("### Verdict: passed").verdict(), Verdict::Passed);
        assert_eq!(parse_review_output("### Verdict: Needs_Work").verdict(), Verdict::NeedsWork);
    }

    #[test]
    fn test_no_verdict_defaults_to_passed() {
        let output = parse_review_output("Some random text without a verdict");
        assert!(output.is_passed());
        assert!(parse_review_output("").is_passed());
    }

    #[test]
    fn test_needs_work_without_entries() {
        let output = parse_review_output("### Verdict: NEEDS_WORK\n\nThings are bad but unstructured.\n");
        assert_eq!(output.verdict(), Verdict::NeedsWork);
        assert!(output.findings().is_empty());
    }

    #[test]
    fn test_passed_ignores_trailing_finding_text() {
        let text = TWO_FINDINGS.replace("NEEDS_WORK", "PASSED");
        let output = parse_review_output(&text);

        assert!(output.is_passed());
        assert!(output.findings().is_empty());
    }

    #[test]
    fn test_multiline_issue_and_suggestion() {
        let text = r"
### Verdict: NEEDS_WORK

1. **FINDING-001**: Complexity - Function too complex
   - File: src/ralph/services/review_loop.py:150
   - Issue: The function has a cyclomatic complexity of 15 which exceeds
     the recommended maximum of 10. Consider breaking it into smaller
     helper functions.
   - Suggestion: Extract the validation logic into a separate function
     and the processing logic into another function to reduce complexity.

---
";
        let findings = parse_findings(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].issue,
            "The function has a cyclomatic complexity of 15 which exceeds\nthe recommended maximum of 10. Consider breaking it into smaller\nhelper functions."
        );
        assert_eq!(
            findings[0].suggestion,
            "Extract the validation logic into a separate function\nand the processing logic into another function to reduce complexity."
        );
    }

    #[test]
    fn test_malformed_entry_is_dropped() {
        let text = r"
### Verdict: NEEDS_WORK

1. **FINDING-001**: Style - Missing file field
   - Issue: No location given
   - Suggestion: Should not parse

2. **FINDING-002**: Style - Complete entry
   - File: lib.rs:7
   - Issue: Present
   - Suggestion: Present too
";
        let findings = parse_review_output(text).into_findings();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, "FINDING-002");
        assert_eq!(findings[0].line_number, Some(7));
    }

    #[test]
    fn test_suggestion_stops_at_next_entry() {
        let text = "### Verdict: NEEDS_WORK\n1. **A**: X - y\n - File: a.rs\n - Issue: i\n - Suggestion: s\n2. **B**: Z - w\n - File: b.rs:1\n - Issue: j\n - Suggestion: t\n[Review] end\n";
        let findings = parse_findings(text);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].suggestion, "s");
        assert_eq!(findings[1].suggestion, "t");
    }

    #[test]
    fn test_split_location() {
        assert_eq!(split_location("`src/a.rs:12`"), ("src/a.rs".to_string(), Some(12)));
        assert_eq!(split_location("README.md"), ("README.md".to_string(), None));
        assert_eq!(split_location("weird:path"), ("weird:path".to_string(), None));
    }

    #[test]
    fn test_split_location_with_column() {
        assert_eq!(split_location("src/a.rs:42:7"), ("src/a.rs".to_string(), Some(42)));
        assert_eq!(split_location("`lib/mod.py:3:1`"), ("lib/mod.py".to_string(), Some(3)));
    }

    #[test]
    fn test_suggestion_keeps_indented_hash_lines() {
        let text = r"
### Verdict: NEEDS_WORK

1. **RS-001**: Derives - Missing Debug
   - File: src/model.rs:3
   - Issue: The struct cannot be printed in logs.
   - Suggestion: Add a derive above the struct:
     #[derive(Debug)]
     pub struct Foo;
     # then rerun the checks

### Summary

One finding.
";
        let findings = parse_findings(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].suggestion,
            "Add a derive above the struct:\n#[derive(Debug)]\npub struct Foo;\n# then rerun the checks"
        );
    }

    #[test]
    fn test_section_heading_detection() {
        assert!(is_section_heading("### Summary"));
        assert!(is_section_heading("#\ttabbed"));
        assert!(!is_section_heading("#[derive(Debug)]"));
        assert!(!is_section_heading("   # comment"));
        assert!(!is_section_heading("####### seven"));
    }

    #[test]
    fn test_category_with_hyphenated_name() {
        assert_eq!(category_of("Thread-safety - Shared state"), "Thread-safety");
        assert_eq!(category_of("Naming"), "Naming");
    }

    #[test]
    fn test_verdict_serialization() {
        assert_eq!(serde_json::to_string(&Verdict::NeedsWork).unwrap(), "\"NEEDS_WORK\"");
        let json = serde_json::to_value(ReviewOutput::passed()).unwrap();
        assert_eq!(json["verdict"], "PASSED");
    }
}
