//! ac-engine: source-code similarity detection for programming assignments
//!
//! Submissions are reduced to canonical token streams that ignore layout,
//! comments and identifier names, then compared pairwise with the normalized
//! compression distance. A substring index over the sources finds fragments
//! shared by only a few submissions and maps them back to file offsets.
//!
//! # Supported Languages
//!
//! - Java, C, C++, C#, Kotlin
//! - JavaScript, TypeScript, TSX
//! - Python, Rust, Go, Bash, HTML
//! - Anything else through the whitespace-only null tokenizer
//!
//! # Example
//!
//! ```ignore
//! use ac_engine::{AnalysisConfig, Analyzer, CorpusLoader};
//! use std::path::Path;
//!
//! let corpus = CorpusLoader::new().load(Path::new("assignment-1"))?;
//! let report = Analyzer::new(AnalysisConfig::default()).run(&corpus)?;
//! for pair in report.top(10) {
//!     println!("{:.3} {} {}", pair.distance, pair.a, pair.b);
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod lang;
pub mod offset_map;
pub mod ptrie;
pub mod report;
pub mod similarity;
pub mod tokenizer;

// Re-export commonly used types
pub use analysis::Analyzer;
pub use cli::{Cli, OutputFormat};
pub use config::AnalysisConfig;
pub use corpus::{Corpus, CorpusLoader, SourceFile, Submission};
pub use error::{AcError, Result};
pub use filter::{parse_filter, parse_filter_str, FileSubject, Filter, Predicate};
pub use lang::Lang;
pub use offset_map::OffsetMapper;
pub use ptrie::SubstringIndex;
pub use report::{format_report, AnalysisReport, PairScore};
pub use similarity::{
    token_count_distance, CancellationToken, CompressorKind, NcdEngine, Outcome,
};
pub use tokenizer::{CanonicalStream, Tokenizer, TokenizerRegistry, TokenizerSelector};
