//! Extension-pattern registry and per-corpus tokenizer selection

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::{NullTokenizer, Tokenizer, TreeSitterTokenizer};
use crate::corpus::Submission;
use crate::error::{AcError, Result};
use crate::lang::Lang;

/// How an entry decides whether it claims an extension
enum ExtensionMatcher {
    /// Exact membership in a fixed extension list
    Listed(&'static [&'static str]),
    /// User-supplied regex, anchored at both ends
    Pattern(Regex),
}

impl ExtensionMatcher {
    fn is_match(&self, ext: &str) -> bool {
        match self {
            Self::Listed(exts) => exts.contains(&ext),
            Self::Pattern(re) => re.is_match(ext),
        }
    }
}

struct RegistryEntry {
    source: String,
    matcher: ExtensionMatcher,
    tokenizer: Arc<dyn Tokenizer>,
}

/// Ordered table of extension pattern to tokenizer.
///
/// Patterns are regexes matched against the whole lowercased extension
/// (the text after the last `.` of the file name). Entries are tried in
/// registration order and the first match wins.
pub struct TokenizerRegistry {
    entries: Vec<RegistryEntry>,
    null: Arc<dyn Tokenizer>,
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TokenizerRegistry {
    /// Registry with no entries; every file resolves to the null tokenizer
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            null: Arc::new(NullTokenizer),
        }
    }

    /// Registry with one tree-sitter tokenizer per bundled grammar.
    ///
    /// Bundled entries match their extension list directly; the listed
    /// `source` is the equivalent regex alternation.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.entries = Lang::ALL
            .iter()
            .map(|&lang| RegistryEntry {
                source: lang.extension_pattern(),
                matcher: ExtensionMatcher::Listed(lang.extensions()),
                tokenizer: Arc::new(TreeSitterTokenizer::new(lang)),
            })
            .collect();
        registry
    }

    /// Append an entry after all existing ones
    pub fn register(&mut self, pattern: &str, tokenizer: Arc<dyn Tokenizer>) -> Result<()> {
        let compiled = compile_pattern(pattern)?;
        self.entries.push(RegistryEntry {
            source: pattern.to_string(),
            matcher: ExtensionMatcher::Pattern(compiled),
            tokenizer,
        });
        Ok(())
    }

    /// Index of the first entry whose pattern matches the file's extension
    pub fn lookup_index(&self, path: &Path) -> Option<usize> {
        let ext = extension_of(path)?;
        self.entries.iter().position(|e| e.matcher.is_match(&ext))
    }

    /// Tokenizer registered for this file, if any
    pub fn lookup(&self, path: &Path) -> Option<Arc<dyn Tokenizer>> {
        self.lookup_index(path)
            .map(|i| Arc::clone(&self.entries[i].tokenizer))
    }

    /// Tokenizer registered under a language name
    pub fn for_language(&self, name: &str) -> Result<Arc<dyn Tokenizer>> {
        if name.eq_ignore_ascii_case("null") {
            return Ok(self.null());
        }
        let canonical = Lang::from_name(name)
            .map(|l| l.name().to_string())
            .unwrap_or_else(|_| name.to_lowercase());
        self.entries
            .iter()
            .find(|e| e.tokenizer.name() == canonical)
            .map(|e| Arc::clone(&e.tokenizer))
            .ok_or_else(|| AcError::UnsupportedLanguage {
                name: name.to_string(),
            })
    }

    pub fn null(&self) -> Arc<dyn Tokenizer> {
        Arc::clone(&self.null)
    }

    /// (pattern, tokenizer name) pairs in registration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.source.as_str(), e.tokenizer.name()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| AcError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_lowercase())
}

/// Outcome of the per-corpus vote
#[derive(Clone)]
pub struct Selection {
    pub tokenizer: Arc<dyn Tokenizer>,
    /// Votes per candidate in registration order, null last; zero-vote
    /// candidates omitted
    pub votes: Vec<(String, usize)>,
    /// True when the null tokenizer won
    pub is_fallback: bool,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("tokenizer", &self.tokenizer.name())
            .field("votes", &self.votes)
            .field("is_fallback", &self.is_fallback)
            .finish()
    }
}

/// Vote summary as it appears in reports
#[derive(Debug, Clone, Serialize)]
pub struct VoteSummary {
    pub tokenizer: String,
    pub votes: Vec<(String, usize)>,
    pub is_fallback: bool,
}

impl From<&Selection> for VoteSummary {
    fn from(selection: &Selection) -> Self {
        Self {
            tokenizer: selection.tokenizer.name().to_string(),
            votes: selection.votes.clone(),
            is_fallback: selection.is_fallback,
        }
    }
}

/// Chooses one tokenizer for a whole corpus.
///
/// Every file of every submission casts one vote for the tokenizer its
/// extension resolves to, or for the null tokenizer when none matches.
/// The most votes wins; ties go to the earlier registration, and the null
/// tokenizer ranks after every registered one.
pub struct TokenizerSelector<'a> {
    registry: &'a TokenizerRegistry,
    allow_fallback: bool,
}

impl<'a> TokenizerSelector<'a> {
    pub fn new(registry: &'a TokenizerRegistry) -> Self {
        Self {
            registry,
            allow_fallback: true,
        }
    }

    /// Whether the null tokenizer may win the vote
    pub fn with_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = allow;
        self
    }

    pub fn choose(&self, submissions: &[Submission]) -> Result<Selection> {
        let null_slot = self.registry.len();
        let mut counts = vec![0usize; null_slot + 1];

        for submission in submissions {
            for file in &submission.files {
                let slot = self.registry.lookup_index(&file.path).unwrap_or(null_slot);
                counts[slot] += 1;
            }
        }

        let total: usize = counts.iter().sum();
        let winner = if total == 0 {
            null_slot
        } else {
            let mut best = 0;
            for (slot, &count) in counts.iter().enumerate() {
                if count > counts[best] {
                    best = slot;
                }
            }
            best
        };

        let votes: Vec<(String, usize)> = counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(slot, &count)| (self.slot_name(slot).to_string(), count))
            .collect();
        debug!("Tokenizer votes: {:?}", votes);

        let is_fallback = winner == null_slot;
        if is_fallback && !self.allow_fallback {
            return Err(AcError::Config {
                message: format!(
                    "no registered tokenizer matches this corpus ({} files) and fallback is disabled",
                    total
                ),
            });
        }

        let tokenizer = if is_fallback {
            self.registry.null()
        } else {
            Arc::clone(&self.registry.entries[winner].tokenizer)
        };

        Ok(Selection {
            tokenizer,
            votes,
            is_fallback,
        })
    }

    fn slot_name(&self, slot: usize) -> &str {
        match self.registry.entries.get(slot) {
            Some(entry) => entry.tokenizer.name(),
            None => self.registry.null.name(),
        }
    }
}
