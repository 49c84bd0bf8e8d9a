//! Review run bookkeeping.
//!
//! Parses reviewer output into verdicts and findings, persists progress
//! across interrupted runs, and decides which reviewers apply and gate.

mod finding;
mod gate;
mod state;

pub use finding::{parse_findings, parse_review_output, parse_verdict, Finding, ReviewOutput, Verdict};
pub use gate::{applicable, is_enforced, should_run};
pub use state::{compute_config_hash, is_stale, ReviewState, StateStatus};
