//! Passthrough tokenizer for files no grammar claims

use once_cell::sync::Lazy;
use regex::Regex;

use super::{CanonicalStream, Tokenizer};
use crate::error::Result;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Emits the source verbatim with whitespace runs collapsed to one space.
///
/// Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTokenizer;

impl Tokenizer for NullTokenizer {
    fn name(&self) -> &str {
        "null"
    }

    fn tokenize(&self, source: &str) -> Result<CanonicalStream> {
        let collapsed = WHITESPACE.replace_all(source, " ").into_owned();
        Ok(CanonicalStream::from_text(collapsed))
    }
}
