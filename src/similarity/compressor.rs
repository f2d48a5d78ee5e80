//! Compressors used to measure information content
//!
//! Only the compressed size matters, so output is counted and discarded
//! where the backend allows writing into a sink.

use std::io::{self, Write};
use std::sync::Arc;

use clap::ValueEnum;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{AcError, Result};

/// A deterministic general-purpose compressor.
///
/// One instance is used for a whole run; mixing compressors makes
/// distances incomparable.
pub trait Compressor: Send + Sync {
    fn name(&self) -> &str;

    /// Size in bytes of `data` once compressed
    fn compressed_size(&self, data: &[u8]) -> Result<usize>;
}

/// Write sink that only counts bytes
#[derive(Default)]
struct CountingSink {
    written: usize,
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn compression_error(backend: &str, e: impl std::fmt::Display) -> AcError {
    AcError::Compression {
        message: format!("{}: {}", backend, e),
    }
}

/// Raw DEFLATE via flate2
#[derive(Debug, Clone, Copy)]
pub struct DeflateCompressor {
    level: u32,
}

impl DeflateCompressor {
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self::new(9)
    }
}

impl Compressor for DeflateCompressor {
    fn name(&self) -> &str {
        "deflate"
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        let mut encoder = DeflateEncoder::new(CountingSink::default(), Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| compression_error("deflate", e))?;
        let sink = encoder
            .finish()
            .map_err(|e| compression_error("deflate", e))?;
        Ok(sink.written)
    }
}

/// Zstandard
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(19)
    }
}

impl Compressor for ZstdCompressor {
    fn name(&self) -> &str {
        "zstd"
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        zstd::encode_all(data, self.level)
            .map(|out| out.len())
            .map_err(|e| compression_error("zstd", e))
    }
}

/// LZ4 block format; fast but a coarse size estimate
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn name(&self) -> &str {
        "lz4"
    }

    fn compressed_size(&self, data: &[u8]) -> Result<usize> {
        Ok(lz4_flex::block::compress(data).len())
    }
}

/// Compressor choice as it appears in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressorKind {
    #[default]
    Deflate,
    Zstd,
    Lz4,
}

impl CompressorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deflate => "deflate",
            Self::Zstd => "zstd",
            Self::Lz4 => "lz4",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "deflate" | "zip" => Ok(Self::Deflate),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            other => Err(AcError::Config {
                message: format!(
                    "Unknown compressor: {}. Must be one of: deflate, zstd, lz4",
                    other
                ),
            }),
        }
    }

    /// Instantiate, using the backend's default level when none is given
    pub fn build(&self, level: Option<i32>) -> Arc<dyn Compressor> {
        match (self, level) {
            (Self::Deflate, Some(level)) => {
                Arc::new(DeflateCompressor::new(level.clamp(0, 9) as u32))
            }
            (Self::Deflate, None) => Arc::new(DeflateCompressor::default()),
            (Self::Zstd, Some(level)) => Arc::new(ZstdCompressor::new(level)),
            (Self::Zstd, None) => Arc::new(ZstdCompressor::default()),
            (Self::Lz4, _) => Arc::new(Lz4Compressor),
        }
    }
}
