//! Tokenizers: source text to canonical symbol streams
//!
//! A [`CanonicalStream`] is what submissions are compared on. It is built so
//! that two sources differing only in whitespace, formatting, comments or
//! identifier names produce the same stream.
//!
//! # Architecture
//!
//! - [`Tokenizer`] is the capability every language implementation provides.
//! - [`TreeSitterTokenizer`] walks a tree-sitter parse tree and emits one
//!   symbol per leaf, collapsing identifiers and literals to placeholders.
//! - [`NullTokenizer`] is the fallback for files no grammar claims.
//! - [`TokenizerRegistry`] maps extension patterns to tokenizers, and
//!   [`TokenizerSelector`] picks one tokenizer per corpus by majority vote.

pub mod null;
pub mod registry;
pub mod syntax;

pub use null::NullTokenizer;
pub use registry::{Selection, TokenizerRegistry, TokenizerSelector};
pub use syntax::TreeSitterTokenizer;

use ahash::AHashMap;
use serde::Serialize;

use crate::error::Result;

/// Symbol emitted for every identifier
pub const IDENT_SYMBOL: u32 = 1;
/// Symbol emitted for every literal (numbers, strings, chars)
pub const LITERAL_SYMBOL: u32 = 2;
/// Grammar symbols are offset by this much so they never collide with placeholders
pub const SYMBOL_BASE: u32 = 16;

/// Converts source text into a canonical symbol stream.
///
/// Implementations are shared across worker threads, one instance per corpus.
pub trait Tokenizer: Send + Sync {
    /// Short name used in logs and reports (e.g. "java", "null")
    fn name(&self) -> &str;

    /// Tokenize one file.
    ///
    /// Fails with [`crate::AcError::Tokenization`] when the text cannot be
    /// handled by this tokenizer's grammar. The error carries an empty file
    /// name; callers attach it with [`crate::AcError::in_file`].
    fn tokenize(&self, source: &str) -> Result<CanonicalStream>;

    /// Comment text of one file, one comment per line.
    ///
    /// Tokenizers that cannot tell comments from code return an empty
    /// string.
    fn comments(&self, _source: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// A tokenized file or submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalStream {
    symbols: Vec<u32>,
    text: String,
}

impl CanonicalStream {
    /// Build a stream from grammar symbol codes, rendered as base-32 words
    pub fn from_codes(symbols: Vec<u32>) -> Self {
        let mut text = String::with_capacity(symbols.len() * 3);
        for &code in &symbols {
            push_base32(&mut text, code);
            text.push(' ');
        }
        Self { symbols, text }
    }

    /// Build a stream whose symbols are the characters of `text`
    pub fn from_text(text: String) -> Self {
        let symbols = text.chars().map(u32::from).collect();
        Self { symbols, text }
    }

    pub fn symbols(&self) -> &[u32] {
        &self.symbols
    }

    /// Text rendering, the form that gets compressed and indexed
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Append another stream, separating the renderings with `separator`
    pub fn extend(&mut self, other: &CanonicalStream, separator: &str) {
        if !self.text.is_empty() && !other.text.is_empty() {
            self.text.push_str(separator);
        }
        self.symbols.extend_from_slice(&other.symbols);
        self.text.push_str(&other.text);
    }

    /// Occurrence count of every symbol
    pub fn histogram(&self) -> AHashMap<u32, usize> {
        let mut counts = AHashMap::new();
        for &symbol in &self.symbols {
            *counts.entry(symbol).or_insert(0) += 1;
        }
        counts
    }
}

fn push_base32(out: &mut String, mut value: u32) {
    const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
    let mut buf = [0u8; 7];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = DIGITS[(value % 32) as usize];
        value /= 32;
        if value == 0 {
            break;
        }
    }
    for &b in &buf[i..] {
        out.push(b as char);
    }
}
