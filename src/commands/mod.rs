//! Command modules for the ac-engine CLI
//!
//! ## Architecture
//!
//! Each command module implements a single top-level command:
//! - `analyze` - Pairwise similarity of a corpus, with optional fragments
//! - `select` - Preview the files a filter accepts
//! - `tokenize` - Show a file's canonical token stream
//! - `languages` - List registered tokenizers
//! - `config` - Show and edit the configuration file
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format and verbosity, and return
//! the text to print on stdout.

pub mod analyze;
pub mod config;
pub mod languages;
pub mod select;
pub mod tokenize;

pub use analyze::run_analyze;
pub use config::run_config;
pub use languages::run_languages;
pub use select::run_select;
pub use tokenize::run_tokenize;

use crate::cli::OutputFormat;
use crate::error::{AcError, Result};
use crate::filter::{parse_filter, Filter};

/// Shared context passed to all command handlers
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Output format (text or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    /// Show progress during long operations
    pub progress: bool,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args
    pub fn from_cli(format: OutputFormat, verbose: bool, progress: bool) -> Self {
        Self {
            format,
            verbose,
            progress,
        }
    }
}

/// Parse `--filter` tokens; no tokens accepts every file
pub(crate) fn filter_from_tokens(tokens: &[String]) -> Result<Filter> {
    if tokens.is_empty() {
        Ok(Filter::accept_all())
    } else {
        parse_filter(tokens)
    }
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| AcError::Config {
            message: format!("JSON serialization failed: {}", e),
        })
}
