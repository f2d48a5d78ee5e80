//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{AnalysisConfig, FragmentSource, NcdInput};
use crate::similarity::CompressorKind;

/// Source-code similarity detection for programming assignments
#[derive(Parser, Debug)]
#[command(name = "ac-engine")]
#[command(about = "Finds suspiciously similar submissions in a corpus of programming assignments")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show a progress bar during the pairwise phase
    #[arg(long, global = true)]
    pub progress: bool,
}

// ============================================
// Main Commands Enum
// ============================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare every pair of submissions in a corpus directory
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Preview which files a filter selects in a corpus
    #[command(visible_alias = "s")]
    Select(SelectArgs),

    /// Print the canonical token stream of one file
    #[command(visible_alias = "t")]
    Tokenize(TokenizeArgs),

    /// List registered tokenizers and their extension patterns
    Languages,

    /// Manage ac-engine configuration
    Config(ConfigArgs),
}

// ============================================
// Analyze Subcommand
// ============================================

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Corpus directory; each first-level entry is one submission
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// File filter in prefix notation (e.g. --filter AND e:java NOT Test)
    #[arg(long, value_name = "TOKEN", num_args = 1..)]
    pub filter: Vec<String>,

    /// Force a tokenizer instead of voting on file extensions
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Compressor used for NCD
    #[arg(short, long, value_enum)]
    pub compressor: Option<CompressorKind>,

    /// Compression level
    #[arg(long)]
    pub level: Option<i32>,

    /// What gets compressed for each submission
    #[arg(long, value_enum)]
    pub input: Option<NcdInput>,

    /// Search for fragments shared by few submissions
    #[arg(long)]
    pub fragments: bool,

    /// Minimum fragment length in characters
    #[arg(long, value_name = "N")]
    pub min_len: Option<usize>,

    /// Maximum indexed substring length in characters
    #[arg(long, value_name = "N")]
    pub max_len: Option<usize>,

    /// Text indexed for fragment search
    #[arg(long, value_enum)]
    pub fragment_source: Option<FragmentSource>,

    /// Weight in [0, 1] of the outlier factor in the adjusted distance
    #[arg(long, value_name = "W")]
    pub outlier_importance: Option<f64>,

    /// Skip comparing comments
    #[arg(long)]
    pub no_comments: bool,

    /// Show only the N closest pairs
    #[arg(short = 'n', long, value_name = "N")]
    pub top: Option<usize>,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail instead of falling back to the whitespace tokenizer
    #[arg(long)]
    pub no_fallback: bool,
}

// ============================================
// Select Subcommand
// ============================================

/// Arguments for the select command
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Corpus directory
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// File filter in prefix notation
    #[arg(long, value_name = "TOKEN", num_args = 1..)]
    pub filter: Vec<String>,
}

// ============================================
// Tokenize Subcommand
// ============================================

/// Arguments for the tokenize command
#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// Source file to tokenize
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Tokenizer to use (defaults to the one matching the file extension)
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,
}

// ============================================
// Config Subcommand
// ============================================

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, value_name = "FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Config operation: show, get, set, reset
    #[command(subcommand)]
    pub operation: ConfigOperation,
}

/// Config subcommand operations
#[derive(Subcommand, Debug)]
pub enum ConfigOperation {
    /// Show current configuration
    Show,

    /// Print one configuration value
    Get {
        /// Configuration key (e.g., ncd.compressor, fragments.min_len)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., ncd.compressor, fragments.min_len)
        key: String,
        /// Value to set
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}

// ============================================
// Output Format
// ============================================

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with visual formatting (default for terminal)
    #[default]
    #[value(alias = "pretty")]
    Text,
    /// JSON - standard JSON output for machine parsing
    Json,
}

// ============================================
// Helper Implementations
// ============================================

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of file configuration
    pub fn apply_to(&self, config: &mut AnalysisConfig) {
        if let Some(language) = &self.language {
            config.tokenizer.language = Some(language.clone());
        }
        if self.no_fallback {
            config.tokenizer.allow_fallback = false;
        }
        if let Some(compressor) = self.compressor {
            config.ncd.compressor = compressor;
        }
        if let Some(level) = self.level {
            config.ncd.level = Some(level);
        }
        if let Some(input) = self.input {
            config.ncd.input = input;
        }
        if self.fragments {
            config.fragments.enabled = true;
        }
        if let Some(min_len) = self.min_len {
            config.fragments.min_len = min_len;
            config.fragments.max_len = config.fragments.max_len.max(min_len);
        }
        if let Some(max_len) = self.max_len {
            config.fragments.max_len = max_len;
        }
        if let Some(source) = self.fragment_source {
            config.fragments.source = source;
        }
        if let Some(importance) = self.outlier_importance {
            config.scores.outlier_importance = importance;
        }
        if self.no_comments {
            config.scores.comments = false;
        }
    }
}
