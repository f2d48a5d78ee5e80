//! Error types and exit codes for ac-engine

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for ac-engine operations
#[derive(Error, Debug)]
pub enum AcError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported language: {name}")]
    UnsupportedLanguage { name: String },

    /// Source text the chosen tokenizer cannot handle. Recovered per file.
    #[error("Failed to tokenize {file}: {message}")]
    Tokenization { file: String, message: String },

    #[error("Filter syntax error: {message}")]
    FilterSyntax { message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Offset {offset} outside text bounds 0..={len}")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// Raised by shared queries on an index whose statistics are out of date.
    #[error("Substring index statistics are stale; call update_stats() first")]
    StaleIndex,

    #[error("No node {node} in a substring index of {len} nodes")]
    UnknownNode { node: usize, len: usize },

    #[error("Compression failed: {message}")]
    Compression { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcError {
    /// Convert error to an exit code:
    /// - 0: Success
    /// - 1: File not found / IO error
    /// - 2: Unsupported language or configuration error
    /// - 3: Tokenization failure
    /// - 4: Filter expression error
    /// - 5: Internal error (offsets, index state, compressor)
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::Io(_) => ExitCode::from(1),
            Self::UnsupportedLanguage { .. } => ExitCode::from(2),
            Self::Config { .. } => ExitCode::from(2),
            Self::Tokenization { .. } => ExitCode::from(3),
            Self::FilterSyntax { .. } => ExitCode::from(4),
            Self::InvalidPattern { .. } => ExitCode::from(4),
            Self::OffsetOutOfRange { .. } => ExitCode::from(5),
            Self::StaleIndex => ExitCode::from(5),
            Self::UnknownNode { .. } => ExitCode::from(5),
            Self::Compression { .. } => ExitCode::from(5),
        }
    }

    /// Attach a file name to a tokenization error; other errors pass through
    pub fn in_file(self, file: &str) -> Self {
        match self {
            Self::Tokenization { message, .. } => Self::Tokenization {
                file: file.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Whether this error is a per-file data problem rather than a fatal one
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Tokenization { .. })
    }
}

/// Result type alias for ac-engine operations
pub type Result<T> = std::result::Result<T, AcError>;
