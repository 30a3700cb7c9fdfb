//! Command-line interface definitions and parsing
//!
//! This module defines the CLI for metanyx using the `clap` crate and turns
//! parsed arguments into the typed values the library works with
//! ([`SearchFilters`], [`WriDirective`], [`QueryMode`]).
//!
//! # Commands
//!
//! - **read**: index a file or directory tree
//! - **view**: query the index and print entries
//! - **wri**: apply touch/time/chmod/rename to matching files
//! - **clear**: delete every indexed entry
//! - **info**: show store location and size
//! - **completions**: print a shell completion script
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use metanyx::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_from(["metanyx", "view", "--ext", "js", "--json"]);
//! assert!(matches!(cli.command, Commands::View { .. }));
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::commands::wri::{WriDirective, WriOp};
use crate::config::OutputFormat;
use crate::db::SearchFilters;
use crate::meta::EntryType;
use crate::search::QueryMode;
use crate::timeexpr::{Bound, TimeParseError, parse_absolute};

/// Query mode argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Exact lookup of the target path
    Single,
    /// Files below the target (or --under) directory
    List,
    /// Filtered search over the whole index
    Search,
}

impl From<ModeArg> for QueryMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Single => Self::Single,
            ModeArg::List => Self::List,
            ModeArg::Search => Self::Search,
        }
    }
}

/// Entry type argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArg {
    File,
    Dir,
}

impl From<TypeArg> for EntryType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::File => Self::File,
            TypeArg::Dir => Self::Dir,
        }
    }
}

/// Mutation argument for `wri --op`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpArg {
    /// Set atime and mtime to now
    Touch,
    /// Shift atime/mtime by deltas, optionally refresh ctime
    Time,
    /// Change permission bits
    Chmod,
    /// Rename within the same directory
    Rename,
}

impl From<OpArg> for WriOp {
    fn from(arg: OpArg) -> Self {
        match arg {
            OpArg::Touch => Self::Touch,
            OpArg::Time => Self::Time,
            OpArg::Chmod => Self::Chmod,
            OpArg::Rename => Self::Rename,
        }
    }
}

/// Parse a permission argument
///
/// `0o644` is octal, as is any 3 or 4 digit string of octal digits (`644`,
/// `0755`); anything else is read as decimal.
///
/// # Errors
///
/// Returns a message if the value is not a number.
pub fn parse_chmod(raw: &str) -> Result<u32, String> {
    let s = raw.trim();
    let parsed = if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        u32::from_str_radix(oct, 8)
    } else if (3..=4).contains(&s.len()) && s.chars().all(|c| ('0'..='7').contains(&c)) {
        u32::from_str_radix(s, 8)
    } else {
        s.parse::<u32>()
    };
    parsed.map_err(|_| format!("invalid permission mode '{raw}'"))
}

/// Parse a time bound: a raw epoch-millisecond integer or an absolute expression
///
/// # Errors
///
/// Returns `TimeParseError::UnparsableAbsolute` if neither form matches.
pub fn parse_time_bound(raw: &str, bound: Bound) -> Result<i64, TimeParseError> {
    let s = raw.trim();
    match s.parse::<i64>() {
        Ok(ms) => Ok(ms),
        Err(_) => parse_absolute(s, bound),
    }
}

/// Filter flags shared by `view` and `wri`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Base name contains (case-insensitive for ASCII)
    #[arg(long = "name", value_name = "TEXT")]
    pub name: Option<String>,

    /// Exact extension, with or without the dot
    #[arg(long = "ext", value_name = "EXT")]
    pub ext: Option<String>,

    /// Only entries below this directory
    #[arg(long = "under", value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub under: Option<PathBuf>,

    /// Modified at or after (epoch ms or time expression)
    #[arg(long = "mtime-from", value_name = "TIME")]
    pub mtime_from: Option<String>,

    /// Modified at or before (epoch ms or time expression)
    #[arg(long = "mtime-to", value_name = "TIME")]
    pub mtime_to: Option<String>,

    /// Changed at or after (epoch ms or time expression)
    #[arg(long = "ctime-from", value_name = "TIME")]
    pub ctime_from: Option<String>,

    /// Changed at or before (epoch ms or time expression)
    #[arg(long = "ctime-to", value_name = "TIME")]
    pub ctime_to: Option<String>,

    /// Minimum size in bytes
    #[arg(long = "size-min", value_name = "BYTES")]
    pub size_min: Option<u64>,

    /// Maximum size in bytes
    #[arg(long = "size-max", value_name = "BYTES")]
    pub size_max: Option<u64>,

    /// Entry type
    #[arg(long = "type", value_name = "TYPE")]
    pub entry_type: Option<TypeArg>,
}

impl FilterArgs {
    /// Build the typed filter set, resolving time expressions
    ///
    /// Lower bounds complete to the start of an omitted unit, upper bounds to its end.
    ///
    /// # Errors
    ///
    /// Returns `TimeParseError` if any time bound is unparsable.
    pub fn to_filters(&self) -> Result<SearchFilters, TimeParseError> {
        let bound = |value: &Option<String>, b: Bound| {
            value
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_time_bound(s, b))
                .transpose()
        };
        Ok(SearchFilters {
            name: self.name.clone(),
            ext: self.ext.clone(),
            under: self.under.clone(),
            mtime_from: bound(&self.mtime_from, Bound::From)?,
            mtime_to: bound(&self.mtime_to, Bound::To)?,
            ctime_from: bound(&self.ctime_from, Bound::From)?,
            ctime_to: bound(&self.ctime_to, Bound::To)?,
            size_min: self.size_min,
            size_max: self.size_max,
            entry_type: self.entry_type.map(EntryType::from),
        })
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Index a file, or everything below a directory
    #[command(visible_alias = "r")]
    Read {
        /// File or directory to index
        #[arg(value_name = "TARGET", value_hint = clap::ValueHint::AnyPath)]
        target: PathBuf,

        /// Delete all entries before indexing
        #[arg(long = "clear")]
        clear: bool,

        /// Store files only, not directories
        #[arg(long = "files-only")]
        files_only: bool,

        /// Skip unreadable children instead of aborting
        #[arg(long = "keep-going")]
        keep_going: bool,
    },

    /// Query indexed entries
    #[command(visible_alias = "v")]
    View {
        /// Path to look up; end it with a separator to list a directory
        #[arg(value_name = "TARGET", value_hint = clap::ValueHint::AnyPath)]
        target: Option<PathBuf>,

        /// Query mode (inferred when omitted)
        #[arg(long = "mode", value_name = "MODE")]
        mode: Option<ModeArg>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Columns to show, comma separated
        #[arg(long = "fields", value_name = "FIELDS", value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Change timestamps, permissions or names of matching files
    #[command(visible_alias = "w")]
    Wri {
        /// Operation to apply
        #[arg(long = "op", value_name = "OP")]
        op: OpArg,

        /// Path to operate on; end it with a separator for a directory
        #[arg(value_name = "TARGET", value_hint = clap::ValueHint::AnyPath)]
        target: Option<PathBuf>,

        /// Query mode (inferred when omitted)
        #[arg(long = "mode", value_name = "MODE")]
        mode: Option<ModeArg>,

        #[command(flatten)]
        filters: FilterArgs,

        /// New base name (rename)
        #[arg(long = "new-name", value_name = "NAME")]
        new_name: Option<String>,

        /// Permission mode: 0o644, 644, 0755 or decimal (chmod)
        #[arg(long = "chmod", value_name = "PERM", value_parser = parse_chmod)]
        chmod: Option<u32>,

        /// mtime delta such as +1h30m or -45s (time)
        #[arg(long = "mtime", value_name = "DELTA", allow_hyphen_values = true)]
        mtime: Option<String>,

        /// atime delta (time)
        #[arg(long = "atime", value_name = "DELTA", allow_hyphen_values = true)]
        atime: Option<String>,

        /// Delta for both atime and mtime when not given separately (time)
        #[arg(long = "time-all", value_name = "DELTA", allow_hyphen_values = true)]
        time_all: Option<String>,

        /// Also refresh ctime via a rename round trip (time)
        #[arg(long = "ctime-touch")]
        ctime_touch: bool,

        /// Show what would change without changing anything
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Delete every indexed entry
    Clear,

    /// Show store location, size and entry count
    Info,

    /// Print a shell completion script
    Completions {
        /// Target shell
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

impl Commands {
    /// Mutation directive of a `wri` command, `None` for other commands
    #[must_use]
    pub fn directive(&self) -> Option<WriDirective> {
        match self {
            Self::Wri {
                op,
                new_name,
                chmod,
                mtime,
                atime,
                time_all,
                ctime_touch,
                ..
            } => Some(WriDirective {
                op: WriOp::from(*op),
                new_name: new_name.clone(),
                mode: *chmod,
                mtime: mtime.clone(),
                atime: atime.clone(),
                time_all: time_all.clone(),
                ctime_touch: *ctime_touch,
            }),
            _ => None,
        }
    }
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "metanyx")]
#[command(about = "Index filesystem metadata and apply batch changes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (overrides config)
    #[arg(long = "db", value_name = "FILE", global = true, value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Extra configuration file (TOML or JSON)
    #[arg(long = "config", value_name = "FILE", global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print JSON (overrides config)
    #[arg(long = "json", global = true, conflicts_with = "table")]
    pub json: bool,

    /// Print tables (overrides config)
    #[arg(long = "table", global = true, conflicts_with = "json")]
    pub table: bool,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Helper method to get the output format override from global flags
    #[must_use]
    pub const fn get_output_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else if self.table {
            Some(OutputFormat::Table)
        } else {
            None
        }
    }
}
