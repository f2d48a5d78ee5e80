//! Position translation between a text and its regex-normalized form
//!
//! Fragments are searched for in normalized text (whitespace runs collapsed,
//! for instance) but must be reported against the original file. An
//! [`OffsetMapper`] records where each replacement changed the text length
//! and converts byte offsets in both directions.

use regex::Regex;
use serde::Serialize;

use crate::error::{AcError, Result};

/// One replacement whose length differs from what it replaced.
///
/// `source_start..source_end` in the original became
/// `dest_start..dest_end` in the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub source_start: usize,
    pub source_end: usize,
    pub dest_start: usize,
    pub dest_end: usize,
}

#[derive(Debug, Clone)]
pub struct OffsetMapper {
    source_len: usize,
    dest: String,
    mappings: Vec<Mapping>,
}

impl OffsetMapper {
    /// Replace every non-overlapping match of `pattern` in `source`, left to
    /// right, with `replacement` (taken literally).
    pub fn new(source: &str, pattern: &Regex, replacement: &str) -> Self {
        let mut dest = String::with_capacity(source.len());
        let mut mappings = Vec::new();
        let mut prev = 0;

        for m in pattern.find_iter(source) {
            dest.push_str(&source[prev..m.start()]);
            if m.len() != replacement.len() {
                mappings.push(Mapping {
                    source_start: m.start(),
                    source_end: m.end(),
                    dest_start: dest.len(),
                    dest_end: dest.len() + replacement.len(),
                });
            }
            dest.push_str(replacement);
            prev = m.end();
        }
        dest.push_str(&source[prev..]);

        Self {
            source_len: source.len(),
            dest,
            mappings,
        }
    }

    /// Like [`Self::new`], compiling the pattern first
    pub fn from_pattern(source: &str, pattern: &str, replacement: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| AcError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(source, &re, replacement))
    }

    /// The normalized text
    pub fn normalized(&self) -> &str {
        &self.dest
    }

    pub fn into_normalized(self) -> String {
        self.dest
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Source offset to normalized offset.
    ///
    /// Offsets inside a replaced span (including its end) map to the start
    /// of the replacement when `bias_low`, else to its end. Valid offsets
    /// are `0..=source_len`.
    pub fn map(&self, offset: usize, bias_low: bool) -> Result<usize> {
        if offset > self.source_len {
            return Err(AcError::OffsetOutOfRange {
                offset,
                len: self.source_len,
            });
        }
        for m in &self.mappings {
            if offset < m.source_start {
                return Ok(m.dest_start - (m.source_start - offset));
            } else if offset <= m.source_end {
                return Ok(if bias_low { m.dest_start } else { m.dest_end });
            }
        }
        Ok(self.dest.len() - (self.source_len - offset))
    }

    /// Normalized offset to source offset; the inverse of [`Self::map`]
    /// outside replaced spans. Valid offsets are `0..=normalized().len()`.
    pub fn rmap(&self, offset: usize, bias_low: bool) -> Result<usize> {
        if offset > self.dest.len() {
            return Err(AcError::OffsetOutOfRange {
                offset,
                len: self.dest.len(),
            });
        }
        for m in &self.mappings {
            if offset < m.dest_start {
                return Ok(m.source_start - (m.dest_start - offset));
            } else if offset <= m.dest_end {
                return Ok(if bias_low {
                    m.source_start
                } else {
                    m.source_end
                });
            }
        }
        Ok(self.source_len - (self.dest.len() - offset))
    }
}
