//! Ralph - multi-reviewer code review pipeline.
//!
//! Thin command-line surface over the Ralph library: reviewer configuration,
//! review output parsing, and review state housekeeping.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ralph::config::{declared_reviewers, load_quality_checks, load_reviewer_configs, Settings};
use ralph::detect::{detection_reason, suggest_missing, LanguageDetector, ReviewerDetector};
use ralph::document::{ensure_gitignore_entry, write_reviewer_config};
use ralph::review::{applicable, compute_config_hash, is_enforced, parse_review_output, ReviewState, StateStatus};
use ralph::{load_manifest, ReviewerConfig, SkillLoader};

/// Multi-reviewer code review pipeline
#[derive(Parser)]
#[command(name = "ralph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Project root
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or write reviewer configuration
    Reviewers {
        #[command(subcommand)]
        operation: ReviewersOperation,
    },

    /// List configured quality checks
    Checks {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Parse reviewer output into a verdict and findings
    ParseReview {
        /// File with reviewer output (`-` for stdin)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with status 1 when the verdict is NEEDS_WORK
        #[arg(long)]
        check: bool,
    },

    /// Inspect or clear persisted review progress
    State {
        #[command(subcommand)]
        operation: StateOperation,
    },

    /// Inspect reviewer skills
    Skills {
        #[command(subcommand)]
        operation: SkillsOperation,
    },

    /// Add the review state file to .gitignore
    Gitignore,

    /// Show settings
    Config {
        /// Show global settings directory
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ReviewersOperation {
    /// Propose reviewers from project contents
    Detect {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the reviewers a run would use
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Treat warning-level reviewers as gating
        #[arg(long)]
        strict: bool,
    },

    /// Write reviewer configuration into the guidance document
    Write {
        /// Replace declared reviewers with detected ones
        #[arg(long)]
        redetect: bool,
    },
}

#[derive(Subcommand)]
enum StateOperation {
    /// Show review progress
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete the review state file
    Clear,
}

#[derive(Subcommand)]
enum SkillsOperation {
    /// List available and installed skills
    List,

    /// Print a skill's instructions
    Show {
        /// Skill reference (e.g. reviewers/release)
        skill: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_env("RALPH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let root = cli.project.as_path();

    match cli.command {
        Commands::Reviewers { operation } => match operation {
            ReviewersOperation::Detect { format } => cmd_reviewers_detect(root, format)?,
            ReviewersOperation::Show { format, strict } => cmd_reviewers_show(root, format, strict)?,
            ReviewersOperation::Write { redetect } => cmd_reviewers_write(root, redetect)?,
        },
        Commands::Checks { format } => cmd_checks(root, format)?,
        Commands::ParseReview { file, format, check } => cmd_parse_review(&file, format, check)?,
        Commands::State { operation } => match operation {
            StateOperation::Show { format } => cmd_state_show(root, format)?,
            StateOperation::Clear => cmd_state_clear(root)?,
        },
        Commands::Skills { operation } => match operation {
            SkillsOperation::List => cmd_skills_list(root)?,
            SkillsOperation::Show { skill } => cmd_skills_show(root, &skill)?,
        },
        Commands::Gitignore => cmd_gitignore(root)?,
        Commands::Config { path } => cmd_config(root, path)?,
        Commands::Completions { shell } => cmd_completions(shell),
    }

    Ok(())
}

fn print_reviewer(reviewer: &ReviewerConfig, note: &str) {
    let languages = reviewer
        .restricted_languages()
        .map(|langs| format!(" [{}]", langs.join(", ")))
        .unwrap_or_default();
    println!("  {} ({}){} - {}", reviewer.name, reviewer.level, languages, note);
}

/// Show reviewers detected from project contents.
fn cmd_reviewers_detect(root: &Path, format: OutputFormat) -> Result<()> {
    let settings = Settings::load(root)?;
    let detected = ReviewerDetector::with_settings(root, &settings.detection).detect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detected)?),
        OutputFormat::Text => {
            println!("Detected {} reviewers in {}\n", detected.len(), root.display());
            for reviewer in &detected {
                print_reviewer(reviewer, detection_reason(&reviewer.name));
            }
        }
    }

    Ok(())
}

/// Show the reviewers a run would use, with gating and applicability.
fn cmd_reviewers_show(root: &Path, format: OutputFormat, strict: bool) -> Result<()> {
    let settings = Settings::load(root)?;
    let document = settings.document_path(root);
    let reviewers = load_reviewer_configs(&document)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&reviewers)?);
        return Ok(());
    }

    let languages = LanguageDetector::with_settings(root, &settings.detection).detect();
    let runnable = applicable(&reviewers, &languages);

    println!("Reviewers from {}\n", document.display());
    for reviewer in &reviewers {
        let applies = runnable.iter().any(|r| r.name == reviewer.name);
        let note = match (applies, is_enforced(reviewer, strict)) {
            (false, _) => "skipped (language not detected)",
            (true, true) => "gating",
            (true, false) => "advisory",
        };
        print_reviewer(reviewer, note);
    }

    let detected = ReviewerDetector::with_settings(root, &settings.detection).detect();
    let missing = suggest_missing(&reviewers, &detected);
    if !missing.is_empty() {
        println!("\nSuggested additions: {}", missing.join(", "));
    }

    Ok(())
}

/// Write reviewer configuration into the guidance document.
fn cmd_reviewers_write(root: &Path, redetect: bool) -> Result<()> {
    let settings = Settings::load(root)?;
    let document = settings.document_path(root);

    let existing = match std::fs::read_to_string(&document) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", document.display())),
    };

    let declared = if redetect { None } else { existing.as_deref().and_then(declared_reviewers) };
    let reviewers = match declared {
        Some(reviewers) => reviewers,
        None => ReviewerDetector::with_settings(root, &settings.detection).detect(),
    };

    write_reviewer_config(&document, &reviewers)
        .with_context(|| format!("Failed to write {}", document.display()))?;
    println!("Wrote {} reviewers to {}", reviewers.len(), document.display());

    Ok(())
}

/// List configured quality checks.
fn cmd_checks(root: &Path, format: OutputFormat) -> Result<()> {
    let settings = Settings::load(root)?;
    let checks = load_quality_checks(&settings.document_path(root))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&checks)?),
        OutputFormat::Text => {
            if checks.is_empty() {
                println!("No quality checks configured");
            }
            for check in &checks {
                let marker = if check.required { "required" } else { "optional" };
                println!("  {} ({}): {}", check.name, marker, check.command);
            }
        }
    }

    Ok(())
}

/// Parse a reviewer's output.
fn cmd_parse_review(file: &Path, format: OutputFormat, check: bool) -> Result<()> {
    let text = if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?
    };

    let output = parse_review_output(&text);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            println!("Verdict: {}", output.verdict());
            for finding in output.findings() {
                let location = finding
                    .line_number
                    .map(|line| format!("{}:{}", finding.file_path, line))
                    .unwrap_or_else(|| finding.file_path.clone());
                println!("\n{} [{}] {}", finding.id, finding.category, location);
                println!("  Issue: {}", finding.issue);
                println!("  Suggestion: {}", finding.suggestion);
            }
        }
    }

    if check && !output.is_passed() {
        std::process::exit(1);
    }

    Ok(())
}

/// Show persisted review progress against the current configuration.
fn cmd_state_show(root: &Path, format: OutputFormat) -> Result<()> {
    let settings = Settings::load(root)?;
    let path = settings.state_path(root);
    let reviewers = load_reviewer_configs(&settings.document_path(root))?;
    let current_hash = compute_config_hash(&reviewers);

    let state = ReviewState::load(&path)?;
    let status = StateStatus::of(state.as_ref(), &current_hash);

    if let OutputFormat::Json = format {
        let value = serde_json::json!({
            "status": status.to_string(),
            "config_hash": current_hash,
            "state": state,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("State: {status} ({})", path.display());
    if let Some(state) = state {
        println!("Updated: {}", state.timestamp);
        for (name, passed) in state.completed() {
            println!("  {} {}", if passed { "PASSED" } else { "NEEDS_WORK" }, name);
        }
        let pending = state.pending();
        if !pending.is_empty() {
            println!("Pending: {}", pending.join(", "));
        }
    }

    Ok(())
}

/// Delete the review state file.
fn cmd_state_clear(root: &Path) -> Result<()> {
    let settings = Settings::load(root)?;
    let path = settings.state_path(root);
    ReviewState::clear(&path)?;
    println!("Cleared {}", path.display());
    Ok(())
}

/// List skills on disk and skills recorded by the last sync.
fn cmd_skills_list(root: &Path) -> Result<()> {
    let settings = Settings::load(root)?;
    let skills_dir = settings.skills_path(root)?;
    let loader = SkillLoader::new(&skills_dir);

    let available = loader.discover();
    println!("Skills in {}: {}", skills_dir.display(), available.len());
    for skill in &available {
        println!("  - {skill}");
    }

    let manifest_path = skills_dir.join(&settings.manifest_file);
    if let Some(manifest) = load_manifest(&manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?
    {
        println!(
            "\nInstalled by sync (v{}, {}): {}",
            manifest.version,
            manifest.synced_at,
            manifest.installed.len()
        );
        for legacy in manifest.legacy_entries() {
            println!("  legacy entry: {legacy}");
        }
    }

    Ok(())
}

/// Print a skill's instructions.
fn cmd_skills_show(root: &Path, skill: &str) -> Result<()> {
    let settings = Settings::load(root)?;
    let loader = SkillLoader::new(settings.skills_path(root)?);
    print!("{}", loader.load(skill)?);
    Ok(())
}

/// Add the review state file to .gitignore.
fn cmd_gitignore(root: &Path) -> Result<()> {
    let settings = Settings::load(root)?;
    let entry = settings.state_file.to_string_lossy();
    let path = ensure_gitignore_entry(root, &entry)?;
    println!("{} lists {}", path.display(), entry);
    Ok(())
}

/// Show settings.
fn cmd_config(root: &Path, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Settings::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let settings = Settings::load(root)?;
    let toml = toml::to_string_pretty(&settings)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ralph", &mut io::stdout());
}
