//! Application configuration for the curriculum toolkit.
//!
//! A project config lives at `<content-root>/curriculum.toml`; the user-wide
//! fallback lives at `~/.curriculum/curriculum.toml`.
//! CLI flags override config file values, which override defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CurriculumError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "curriculum.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".curriculum";

// ---------------------------------------------------------------------------
// Config structs (matching curriculum.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// How content directories are read.
    #[serde(default)]
    pub content: ContentConfig,

    /// Which invariants are enforced and how violations are reported.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Where and how the course tree is written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[content]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// File extensions (without the dot) treated as lessons.
    #[serde(default = "default_lesson_extensions")]
    pub lesson_extensions: Vec<String>,

    /// Skip files and directories whose name starts with `.`.
    #[serde(default = "default_true")]
    pub skip_hidden: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            lesson_extensions: default_lesson_extensions(),
            skip_hidden: true,
        }
    }
}

fn default_lesson_extensions() -> Vec<String> {
    vec!["md".into(), "markdown".into()]
}
fn default_true() -> bool {
    true
}

/// `[validation]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// `collect-all` or `fail-fast`.
    #[serde(default)]
    pub strategy: ValidationStrategy,

    /// Reject front-matter keys outside the lesson schema.
    #[serde(default)]
    pub strict_front_matter: bool,

    /// Course-specific keys accepted even in strict mode.
    #[serde(default)]
    pub allowed_extra_keys: Vec<String>,
}

/// How many violations a module validation reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStrategy {
    /// Report every violation in the module.
    #[default]
    CollectAll,
    /// Stop at the first violation, in check order.
    FailFast,
}

impl fmt::Display for ValidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollectAll => f.write_str("collect-all"),
            Self::FailFast => f.write_str("fail-fast"),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the `build` command writes into.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Pretty-print JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            pretty: true,
        }
    }
}

fn default_output_dir() -> String {
    "dist".into()
}

// ---------------------------------------------------------------------------
// Runtime options (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime validation options, merged from config file + CLI flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOptions {
    pub strategy: ValidationStrategy,
    pub strict_front_matter: bool,
    pub allowed_extra_keys: Vec<String>,
}

impl From<&AppConfig> for ValidationOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            strategy: config.validation.strategy,
            strict_front_matter: config.validation.strict_front_matter,
            allowed_extra_keys: config.validation.allowed_extra_keys.clone(),
        }
    }
}

impl ValidationOptions {
    pub fn fail_fast(&self) -> bool {
        self.strategy == ValidationStrategy::FailFast
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.curriculum/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CurriculumError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.curriculum/curriculum.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the user config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Resolve the config for a content root: `<root>/curriculum.toml` wins over
/// the user config.
pub fn load_config_for(content_root: &Path) -> Result<AppConfig> {
    let local = content_root.join(CONFIG_FILE_NAME);
    if local.is_file() {
        tracing::debug!(path = ?local, "using project config");
        return load_config_from(&local);
    }
    load_config()
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CurriculumError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CurriculumError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the user config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| CurriculumError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CurriculumError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CurriculumError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("lesson_extensions"));
        assert!(toml_str.contains("collect-all"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
        assert_eq!(parsed.output.dir, "dist");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[validation]
strategy = "fail-fast"
strict_front_matter = true
allowed_extra_keys = ["difficulty"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.validation.strategy, ValidationStrategy::FailFast);
        assert_eq!(config.content.lesson_extensions, vec!["md", "markdown"]);
        assert!(config.output.pretty);

        let opts = ValidationOptions::from(&config);
        assert!(opts.fail_fast());
        assert!(opts.strict_front_matter);
        assert_eq!(opts.allowed_extra_keys, vec!["difficulty"]);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result = toml::from_str::<AppConfig>("[validation]\nstrategy = \"sometimes\"\n");
        assert!(result.is_err());
        assert_eq!(ValidationStrategy::FailFast.to_string(), "fail-fast");
    }

    #[test]
    fn project_config_takes_precedence() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[output]\ndir = \"public\"\npretty = false\n",
        )
        .expect("write config");

        let config = load_config_for(dir.path()).expect("load");
        assert_eq!(config.output.dir, "public");
        assert!(!config.output.pretty);
    }

    #[test]
    fn init_config_writes_loadable_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config_in(&dir.path().join("nested")).expect("init");
        let config = load_config_from(&path).expect("load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[validation\n").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
