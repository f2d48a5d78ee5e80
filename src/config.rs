//! Analysis configuration.
//!
//! Read from the file given with `--config`, or otherwise from:
//! - Linux: ~/.config/ac-engine/config.toml
//! - macOS: ~/Library/Application Support/ac-engine/config.toml
//! - Windows: %APPDATA%\ac-engine\config.toml
//!
//! A missing file means defaults. Command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AcError, Result};
use crate::similarity::CompressorKind;

/// Full analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub ncd: NcdConfig,

    #[serde(default)]
    pub fragments: FragmentConfig,

    #[serde(default)]
    pub scores: ScoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tokenizer selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenizerConfig {
    /// Force a language instead of voting (a name accepted by `languages`)
    #[serde(default)]
    pub language: Option<String>,

    /// Permit the whitespace-only null tokenizer to win the vote
    #[serde(default = "default_true")]
    pub allow_fallback: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            language: None,
            allow_fallback: true,
        }
    }
}

/// What gets compressed for each submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NcdInput {
    /// Canonical token streams
    #[default]
    Tokens,
    /// Raw source text
    Raw,
    /// Raw source text with whitespace runs collapsed
    RawCollapsed,
}

impl NcdInput {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Raw => "raw",
            Self::RawCollapsed => "raw_collapsed",
        }
    }
}

/// NCD settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NcdConfig {
    #[serde(default)]
    pub compressor: CompressorKind,

    /// Compression level; backend default when unset
    #[serde(default)]
    pub level: Option<i32>,

    /// Placed between the files of a submission when joining them
    #[serde(default = "default_separator")]
    pub separator: String,

    #[serde(default)]
    pub input: NcdInput,
}

fn default_separator() -> String {
    " ".to_string()
}

impl Default for NcdConfig {
    fn default() -> Self {
        Self {
            compressor: CompressorKind::default(),
            level: None,
            separator: default_separator(),
            input: NcdInput::default(),
        }
    }
}

/// Text indexed for fragment search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FragmentSource {
    /// Source with whitespace runs collapsed; offsets map back to the file
    #[default]
    Normalized,
    /// Canonical token stream rendering; offsets are stream offsets
    Canonical,
}

/// Rare fragment search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FragmentConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Shortest fragment reported, in characters
    #[serde(default = "default_min_len")]
    pub min_len: usize,

    /// Longest substring indexed, in characters
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    #[serde(default = "default_min_submissions")]
    pub min_submissions: usize,

    #[serde(default = "default_max_submissions")]
    pub max_submissions: usize,

    #[serde(default)]
    pub source: FragmentSource,

    #[serde(default = "default_max_reported")]
    pub max_reported: usize,
}

fn default_min_len() -> usize {
    20
}

fn default_max_len() -> usize {
    40
}

fn default_min_submissions() -> usize {
    2
}

fn default_max_submissions() -> usize {
    2
}

fn default_max_reported() -> usize {
    50
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_len: default_min_len(),
            max_len: default_max_len(),
            min_submissions: default_min_submissions(),
            max_submissions: default_max_submissions(),
            source: FragmentSource::default(),
            max_reported: default_max_reported(),
        }
    }
}

/// Secondary scores attached to each pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreConfig {
    /// Compare the comments of each submission with NCD
    #[serde(default = "default_true")]
    pub comments: bool,

    /// Weight of the outlier factor in the adjusted distance, in [0, 1].
    /// At 0 the adjusted distance equals the NCD distance.
    #[serde(default = "default_outlier_importance")]
    pub outlier_importance: f64,
}

fn default_outlier_importance() -> f64 {
    0.5
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            comments: true,
            outlier_importance: default_outlier_importance(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AnalysisConfig {
    /// Platform config file location, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ac-engine").join("config.toml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| AcError::Config {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| AcError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        // Atomic write
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Reject combinations no analysis can run with
    pub fn validate(&self) -> Result<()> {
        let f = &self.fragments;
        if f.min_len == 0 {
            return Err(config_error("fragments.min_len must be at least 1"));
        }
        if f.max_len < f.min_len {
            return Err(config_error(format!(
                "fragments.max_len ({}) is shorter than fragments.min_len ({})",
                f.max_len, f.min_len
            )));
        }
        if f.min_submissions == 0 || f.max_submissions < f.min_submissions {
            return Err(config_error(format!(
                "fragments submission range {}..={} is empty",
                f.min_submissions, f.max_submissions
            )));
        }
        let w = self.scores.outlier_importance;
        if !(0.0..=1.0).contains(&w) {
            return Err(config_error(format!(
                "scores.outlier_importance ({}) must be between 0 and 1",
                w
            )));
        }
        Ok(())
    }

    /// Get a configuration value by key path (e.g., "ncd.compressor")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["tokenizer", "language"] => self.tokenizer.language.clone(),
            ["tokenizer", "allow_fallback"] => Some(self.tokenizer.allow_fallback.to_string()),
            ["ncd", "compressor"] => Some(self.ncd.compressor.name().to_string()),
            ["ncd", "level"] => self.ncd.level.map(|l| l.to_string()),
            ["ncd", "separator"] => Some(self.ncd.separator.clone()),
            ["ncd", "input"] => Some(self.ncd.input.name().to_string()),
            ["fragments", "enabled"] => Some(self.fragments.enabled.to_string()),
            ["fragments", "min_len"] => Some(self.fragments.min_len.to_string()),
            ["fragments", "max_len"] => Some(self.fragments.max_len.to_string()),
            ["fragments", "min_submissions"] => Some(self.fragments.min_submissions.to_string()),
            ["fragments", "max_submissions"] => Some(self.fragments.max_submissions.to_string()),
            ["fragments", "max_reported"] => Some(self.fragments.max_reported.to_string()),
            ["fragments", "source"] => Some(
                match self.fragments.source {
                    FragmentSource::Normalized => "normalized",
                    FragmentSource::Canonical => "canonical",
                }
                .to_string(),
            ),
            ["scores", "comments"] => Some(self.scores.comments.to_string()),
            ["scores", "outlier_importance"] => {
                Some(self.scores.outlier_importance.to_string())
            }
            ["logging", "level"] => Some(self.logging.level.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key path
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["tokenizer", "language"] => {
                if value.is_empty() {
                    self.tokenizer.language = None;
                } else {
                    if value != "null" {
                        crate::lang::Lang::from_name(value)?;
                    }
                    self.tokenizer.language = Some(value.to_string());
                }
            }
            ["tokenizer", "allow_fallback"] => {
                self.tokenizer.allow_fallback = parse_value(key, value)?;
            }
            ["ncd", "compressor"] => {
                self.ncd.compressor = CompressorKind::parse(value)?;
            }
            ["ncd", "level"] => {
                self.ncd.level = if value.is_empty() {
                    None
                } else {
                    Some(parse_value(key, value)?)
                };
            }
            ["ncd", "separator"] => {
                self.ncd.separator = value.to_string();
            }
            ["ncd", "input"] => {
                self.ncd.input = match value {
                    "tokens" => NcdInput::Tokens,
                    "raw" => NcdInput::Raw,
                    "raw_collapsed" => NcdInput::RawCollapsed,
                    _ => {
                        return Err(config_error(format!(
                            "Invalid ncd input: {}. Must be one of: tokens, raw, raw_collapsed",
                            value
                        )))
                    }
                };
            }
            ["fragments", "enabled"] => {
                self.fragments.enabled = parse_value(key, value)?;
            }
            ["fragments", "min_len"] => {
                self.fragments.min_len = parse_value(key, value)?;
            }
            ["fragments", "max_len"] => {
                self.fragments.max_len = parse_value(key, value)?;
            }
            ["fragments", "min_submissions"] => {
                self.fragments.min_submissions = parse_value(key, value)?;
            }
            ["fragments", "max_submissions"] => {
                self.fragments.max_submissions = parse_value(key, value)?;
            }
            ["fragments", "max_reported"] => {
                self.fragments.max_reported = parse_value(key, value)?;
            }
            ["fragments", "source"] => {
                self.fragments.source = match value {
                    "normalized" => FragmentSource::Normalized,
                    "canonical" => FragmentSource::Canonical,
                    _ => {
                        return Err(config_error(format!(
                            "Invalid fragment source: {}. Must be one of: normalized, canonical",
                            value
                        )))
                    }
                };
            }
            ["scores", "comments"] => {
                self.scores.comments = parse_value(key, value)?;
            }
            ["scores", "outlier_importance"] => {
                self.scores.outlier_importance = parse_value(key, value)?;
            }
            ["logging", "level"] => {
                if !["error", "warn", "info", "debug"].contains(&value) {
                    return Err(config_error(format!(
                        "Invalid log level: {}. Must be one of: error, warn, info, debug",
                        value
                    )));
                }
                self.logging.level = value.to_string();
            }
            _ => {
                return Err(config_error(format!("Unknown configuration key: {}", key)));
            }
        }
        self.validate()
    }

    /// Display configuration as TOML
    pub fn display(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn config_error(message: impl Into<String>) -> AcError {
    AcError::Config {
        message: message.into(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| config_error(format!("Invalid value for {}: {}", key, value)))
}
