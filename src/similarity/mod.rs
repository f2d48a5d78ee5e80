//! Similarity measures between submissions
//!
//! The primary score is the normalized compression distance ([`NcdEngine`])
//! over each submission's canonical stream. [`token_count_distance`] is a
//! secondary score that ignores symbol order entirely, and
//! [`outlier_adjusted`] rescales NCD by how much a pair stands out.

pub mod compressor;
pub mod ncd;
pub mod token_count;
pub mod variance;

pub use compressor::{
    CompressorKind, Compressor, DeflateCompressor, Lz4Compressor, ZstdCompressor,
};
pub use ncd::{
    sort_results, CancellationToken, DistanceResult, NcdEngine, Outcome, ProgressFn,
};
pub use token_count::token_count_distance;
pub use variance::outlier_adjusted;
