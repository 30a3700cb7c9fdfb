//! Configuration module for metanyx
//!
//! Settings are layered with the `config` crate, later layers winning:
//! 1. built-in defaults
//! 2. `<config_dir>/metanyx/config.toml`, if present
//! 3. an explicit file passed with `--config` (TOML or JSON, by extension)
//! 4. `METANYX_*` environment variables
//!
//! Command-line flags are applied on top by the caller. Loading never writes
//! a file.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default store file, relative to the working directory
pub const DEFAULT_DATABASE: &str = "metanyx.db";

/// How results are printed
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned columns for terminals
    #[default]
    Table,
    /// Pretty-printed JSON for scripts
    Json,
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MetanyxConfig {
    /// Store location
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Default output format
    #[serde(default)]
    pub output: OutputFormat,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Default columns for `view`; empty means all
    #[serde(default)]
    pub fields: Vec<String>,
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

impl Default for MetanyxConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            output: OutputFormat::default(),
            quiet: false,
            fields: Vec::new(),
        }
    }
}

impl MetanyxConfig {
    /// Get the path to the user config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("metanyx").join("config.toml"))
    }

    /// Load the layered configuration
    ///
    /// # Arguments
    /// * `explicit` - File given with `--config`; must exist when set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the explicit file is missing or any layer
    /// fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // No config directory (minimal containers) just skips that layer
        let user_file = Self::config_path().ok();
        Self::load_from(user_file.as_deref(), explicit)
    }

    /// Same as [`MetanyxConfig::load`] with the user file location supplied
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the explicit file is missing or any layer
    /// fails to parse.
    pub fn load_from(user_file: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database", DEFAULT_DATABASE)?
            .set_default("output", "table")?
            .set_default("quiet", false)?
            .set_default("fields", Vec::<String>::new())?;

        if let Some(path) = user_file {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()).format(format_for(path)));
        }

        builder
            .add_source(
                Environment::with_prefix("METANYX")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("fields"),
            )
            .build()?
            .try_deserialize()
    }
}

/// JSON for `.json` files, TOML otherwise
fn format_for(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
        _ => FileFormat::Toml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MetanyxConfig::default();
        assert_eq!(config.database, PathBuf::from("metanyx.db"));
        assert_eq!(config.output, OutputFormat::Table);
        assert!(!config.quiet);
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_load_without_files_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("config.toml");
        let config = MetanyxConfig::load_from(Some(&missing), None).unwrap();
        assert_eq!(config, MetanyxConfig::default());
    }

    #[test]
    fn test_explicit_json_overrides_user_toml() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("config.toml");
        fs::write(&user, "database = \"user.db\"\nquiet = true\n").unwrap();
        let explicit = dir.path().join("run.json");
        fs::write(&explicit, r#"{"database": "run.db", "output": "json", "fields": ["name", "size"]}"#)
            .unwrap();

        let config = MetanyxConfig::load_from(Some(&user), Some(&explicit)).unwrap();
        assert_eq!(config.database, PathBuf::from("run.db"));
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.quiet);
        assert_eq!(config.fields, vec!["name", "size"]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = MetanyxConfig::load_from(None, Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_format_for_extension() {
        assert_eq!(format_for(Path::new("a.JSON")), FileFormat::Json);
        assert_eq!(format_for(Path::new("a.toml")), FileFormat::Toml);
        assert_eq!(format_for(Path::new("noext")), FileFormat::Toml);
    }
}
