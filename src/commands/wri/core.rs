use colored::Colorize;
use dialoguer::Confirm;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::WriError;
use crate::MetanyxError;
use crate::timeexpr::parse_optional_delta;

/// Highest permission value accepted by chmod (setuid, setgid, sticky and rwx bits)
pub const MAX_MODE: u32 = 0o7777;

/// Mutation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriOp {
    Touch,
    Time,
    Chmod,
    Rename,
}

impl WriOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Time => "time",
            Self::Chmod => "chmod",
            Self::Rename => "rename",
        }
    }
}

impl fmt::Display for WriOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation request as supplied by a caller, before validation
///
/// Delta strings use the grammar of [`crate::timeexpr::parse_delta`]. For the
/// `time` operation, `mtime` and `atime` fall back to `time_all` when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriDirective {
    pub op: WriOp,
    pub new_name: Option<String>,
    pub mode: Option<u32>,
    pub mtime: Option<String>,
    pub atime: Option<String>,
    pub time_all: Option<String>,
    pub ctime_touch: bool,
}

impl WriDirective {
    /// Directive for `op` with no extras
    #[must_use]
    pub const fn new(op: WriOp) -> Self {
        Self {
            op,
            new_name: None,
            mode: None,
            mtime: None,
            atime: None,
            time_all: None,
            ctime_touch: false,
        }
    }
}

/// A validated mutation, ready to run against every target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Set atime and mtime to now
    Touch,
    /// Shift atime and mtime by signed millisecond offsets, optionally refreshing ctime
    Time {
        mtime_delta: i64,
        atime_delta: i64,
        ctime_touch: bool,
    },
    /// Replace the permission bits
    Chmod { mode: u32 },
    /// Move to a new base name in the same directory
    Rename { new_name: String },
}

impl Operation {
    #[must_use]
    pub const fn op(&self) -> WriOp {
        match self {
            Self::Touch => WriOp::Touch,
            Self::Time { .. } => WriOp::Time,
            Self::Chmod { .. } => WriOp::Chmod,
            Self::Rename { .. } => WriOp::Rename,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Touch => write!(f, "touch"),
            Self::Time {
                mtime_delta,
                atime_delta,
                ctime_touch,
            } => {
                write!(f, "shift mtime by {mtime_delta:+}ms, atime by {atime_delta:+}ms")?;
                if *ctime_touch {
                    write!(f, ", refresh ctime")?;
                }
                Ok(())
            }
            Self::Chmod { mode } => write!(f, "chmod {mode:o}"),
            Self::Rename { new_name } => write!(f, "rename to '{new_name}'"),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Reject names that would leave the parent directory or address it
fn validate_new_name(name: &str) -> Result<(), WriError> {
    if name == "." || name == ".." {
        return Err(WriError::InvalidDirective(format!(
            "'{name}' is not a valid file name"
        )));
    }
    if name.chars().any(|c| std::path::is_separator(c) || c == '\0') {
        return Err(WriError::InvalidDirective(format!(
            "new name '{name}' must not contain a path separator"
        )));
    }
    Ok(())
}

impl TryFrom<&WriDirective> for Operation {
    type Error = WriError;

    fn try_from(directive: &WriDirective) -> Result<Self, Self::Error> {
        match directive.op {
            WriOp::Touch => Ok(Self::Touch),
            WriOp::Time => {
                let time_all = non_empty(directive.time_all.as_ref());
                let mtime = non_empty(directive.mtime.as_ref()).or(time_all);
                let atime = non_empty(directive.atime.as_ref()).or(time_all);
                if mtime.is_none() && atime.is_none() && !directive.ctime_touch {
                    return Err(WriError::MissingDirective {
                        op: WriOp::Time,
                        what: "a time delta (mtime, atime or time_all) or a ctime refresh",
                    });
                }
                Ok(Self::Time {
                    mtime_delta: parse_optional_delta(mtime)?,
                    atime_delta: parse_optional_delta(atime)?,
                    ctime_touch: directive.ctime_touch,
                })
            }
            WriOp::Chmod => {
                let mode = directive.mode.ok_or(WriError::MissingDirective {
                    op: WriOp::Chmod,
                    what: "a numeric permission mode",
                })?;
                if mode > MAX_MODE {
                    return Err(WriError::InvalidDirective(format!(
                        "mode {mode:o} exceeds {MAX_MODE:o}"
                    )));
                }
                Ok(Self::Chmod { mode })
            }
            WriOp::Rename => {
                let name = non_empty(directive.new_name.as_ref()).ok_or(
                    WriError::MissingDirective {
                        op: WriOp::Rename,
                        what: "a new name",
                    },
                )?;
                validate_new_name(name)?;
                Ok(Self::Rename {
                    new_name: name.to_string(),
                })
            }
        }
    }
}

/// What a successful mutation left on disk, read back after re-sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OpOutcome {
    Touched {
        atime_ms: Option<i64>,
        mtime_ms: i64,
        ctime_ms: i64,
    },
    TimesSet {
        atime_ms: Option<i64>,
        mtime_ms: i64,
        ctime_ms: i64,
        ctime_refreshed: bool,
    },
    ModeSet {
        mode: u32,
    },
    Renamed {
        from: PathBuf,
        to: PathBuf,
    },
}

impl fmt::Display for OpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atime = |a: &Option<i64>| a.map_or_else(|| "-".to_string(), |v| v.to_string());
        match self {
            Self::Touched {
                atime_ms,
                mtime_ms,
                ctime_ms,
            } => write!(
                f,
                "touched (atime_ms={} mtime_ms={mtime_ms} ctime_ms={ctime_ms})",
                atime(atime_ms)
            ),
            Self::TimesSet {
                atime_ms,
                mtime_ms,
                ctime_ms,
                ctime_refreshed,
            } => {
                write!(
                    f,
                    "atime_ms={} mtime_ms={mtime_ms} ctime_ms={ctime_ms}",
                    atime(atime_ms)
                )?;
                if *ctime_refreshed {
                    write!(f, " (ctime refreshed)")?;
                }
                Ok(())
            }
            Self::ModeSet { mode } => write!(f, "chmod {mode:o}"),
            Self::Renamed { to, .. } => write!(f, "renamed to {}", to.display()),
        }
    }
}

/// Per-target status: serialized as either an `outcome` or an `error` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    Outcome(OpOutcome),
    Error(String),
}

/// Result of running one operation on one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpResult {
    pub op: WriOp,
    pub target: PathBuf,
    #[serde(flatten)]
    pub status: OpStatus,
}

impl OpResult {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, OpStatus::Outcome(_))
    }
}

/// Everything a batch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchReport {
    /// The target set was empty; nothing ran
    NoMatch,
    /// One result per target, in processing order
    Completed(Vec<OpResult>),
}

impl BatchReport {
    #[must_use]
    pub fn results(&self) -> &[OpResult] {
        match self {
            Self::NoMatch => &[],
            Self::Completed(results) => results,
        }
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::new();
        for result in self.results() {
            match &result.status {
                OpStatus::Outcome(_) => summary.add_success(),
                OpStatus::Error(e) => {
                    summary.add_error(format!("{}: {e}", result.target.display()));
                }
            }
        }
        summary
    }
}

/// Success and error tallies of a batch
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub success: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
}

impl BatchSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub const fn add_success(&mut self) {
        self.success += 1;
    }
    pub fn add_error(&mut self, msg: String) {
        self.errors += 1;
        self.error_messages.push(msg);
    }
    pub fn print(&self, operation: &str) {
        println!("\n{}", format!("=== {operation} Summary ===").bold());
        println!("  {} {}", "✓ Success:".green(), self.success);
        if self.errors > 0 {
            println!("  {} {}", "✗ Errors:".red(), self.errors);
            println!("\n{}", "Error details:".red().bold());
            for msg in &self.error_messages {
                println!("  - {msg}");
            }
        }
    }
}

/// Print what a batch would do without touching anything
pub fn print_dry_run_preview(files: &[&Path], op: &Operation) {
    println!("{}", "=== Dry Run Mode ===".yellow().bold());
    println!("Would {} on {} file(s)", op.to_string().cyan(), files.len());
    println!("\n{}", "Affected files:".bold());
    for (i, file) in files.iter().enumerate().take(10) {
        println!("  {}. {}", i + 1, file.display());
    }
    if files.len() > 10 {
        println!("  ... and {} more", files.len() - 10);
    }
    println!("\n{}", "Run without --dry-run to apply changes.".yellow());
}

/// Ask before mutating `files`
///
/// # Errors
///
/// Returns `MetanyxError::InvalidInput` if the prompt cannot be shown (no terminal).
pub fn confirm_operation(files: &[&Path], op: &Operation) -> Result<bool, MetanyxError> {
    let prompt = format!("{} on {} file(s)?", op.to_string().to_uppercase(), files.len());
    Confirm::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| MetanyxError::InvalidInput(format!("Failed to get confirmation: {e}")))
}
