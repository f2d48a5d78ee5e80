//! File filters: which files of a submission take part in an analysis
//!
//! A [`Filter`] is a tree of leaf [`Predicate`]s combined by ALL / ANY /
//! NONE composites. Filters are usually built from the token mini-language
//! in [`parser`], e.g. `AND Test NOT Bad END`.

pub mod parser;

pub use parser::{parse_filter, parse_filter_str};

use std::fmt;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AcError, Result};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================
// Filter subjects
// ============================================

/// A file as seen by a filter
pub trait FileSubject {
    /// File name without directories
    fn name(&self) -> &str;

    /// Path relative to the submission root, `/`-separated
    fn path(&self) -> &str;

    /// Text after the last `.` of the name, empty when there is none
    fn extension(&self) -> &str {
        self.name()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("")
    }

    /// Text content, or `None` for binary or unreadable files.
    /// Only requested by content predicates.
    fn content(&self) -> Option<&str>;

    /// Names of the files in the same directory, this one included.
    /// Only requested by latest-version predicates.
    fn siblings(&self) -> Vec<String> {
        vec![self.name().to_string()]
    }
}

/// A file held in memory
#[derive(Debug, Clone)]
pub struct MemoryFile {
    path: String,
    content: Option<String>,
    siblings: Vec<String>,
}

impl MemoryFile {
    pub fn new(path: impl Into<String>, content: Option<String>) -> Self {
        Self {
            path: path.into(),
            content,
            siblings: Vec::new(),
        }
    }

    /// Other file names in the same directory
    pub fn with_siblings<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.siblings = names.into_iter().map(Into::into).collect();
        self
    }
}

impl FileSubject for MemoryFile {
    fn name(&self) -> &str {
        file_name(&self.path)
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn siblings(&self) -> Vec<String> {
        let mut names = self.siblings.clone();
        names.push(self.name().to_string());
        names
    }
}

/// A file on disk whose content is only read if a content predicate asks
#[derive(Debug)]
pub struct DiskFile {
    relative: String,
    absolute: std::path::PathBuf,
    content: OnceCell<Option<String>>,
}

impl DiskFile {
    pub fn new(relative: impl Into<String>, absolute: impl Into<std::path::PathBuf>) -> Self {
        Self {
            relative: relative.into(),
            absolute: absolute.into(),
            content: OnceCell::new(),
        }
    }

    /// Consume the file, returning its text if it is readable UTF-8
    pub fn into_content(self) -> Option<String> {
        match self.content.into_inner() {
            Some(content) => content,
            None => std::fs::read_to_string(&self.absolute).ok(),
        }
    }
}

impl FileSubject for DiskFile {
    fn name(&self) -> &str {
        file_name(&self.relative)
    }

    fn path(&self) -> &str {
        &self.relative
    }

    fn content(&self) -> Option<&str> {
        self.content
            .get_or_init(|| std::fs::read_to_string(&self.absolute).ok())
            .as_deref()
    }

    fn siblings(&self) -> Vec<String> {
        let Some(dir) = self.absolute.parent() else {
            return vec![self.name().to_string()];
        };
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .collect(),
            Err(_) => vec![self.name().to_string()],
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// ============================================
// Predicates
// ============================================

/// Which attribute of a file a predicate inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Name,
    Path,
    Extension,
    Content,
    /// The name, compared against the other versions in its directory.
    /// The matcher finds the family prefix, e.g. `^hw1_v` in `hw1_v3.java`.
    #[serde(rename = "latest_version")]
    LatestVersion,
}

impl Subject {
    fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Path => "path",
            Self::Extension => "ext",
            Self::Content => "content",
            Self::LatestVersion => "maxv",
        }
    }
}

/// How a predicate tests its subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "MatcherRepr", try_from = "MatcherRepr")]
pub enum Matcher {
    Contains(String),
    EndsWith(String),
    /// Unanchored regex search
    Regex(Regex),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
enum MatcherRepr {
    Contains(String),
    EndsWith(String),
    Matches(String),
}

impl From<Matcher> for MatcherRepr {
    fn from(m: Matcher) -> Self {
        match m {
            Matcher::Contains(s) => Self::Contains(s),
            Matcher::EndsWith(s) => Self::EndsWith(s),
            Matcher::Regex(re) => Self::Matches(re.as_str().to_string()),
        }
    }
}

impl TryFrom<MatcherRepr> for Matcher {
    type Error = AcError;

    fn try_from(repr: MatcherRepr) -> Result<Self> {
        Ok(match repr {
            MatcherRepr::Contains(s) => Self::Contains(s),
            MatcherRepr::EndsWith(s) => Self::EndsWith(s),
            MatcherRepr::Matches(pattern) => Self::Regex(compile(&pattern)?),
        })
    }
}

impl Matcher {
    fn test(&self, text: &str) -> bool {
        match self {
            Self::Contains(needle) => text.contains(needle.as_str()),
            Self::EndsWith(suffix) => text.ends_with(suffix.as_str()),
            Self::Regex(re) => re.is_match(text),
        }
    }

    /// Byte offset just past the first match
    fn match_end(&self, text: &str) -> Option<usize> {
        match self {
            Self::Contains(needle) => text.find(needle.as_str()).map(|i| i + needle.len()),
            Self::EndsWith(suffix) => text.ends_with(suffix.as_str()).then_some(text.len()),
            Self::Regex(re) => re.find(text).map(|m| m.end()),
        }
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AcError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// A single test on one attribute of a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    pub subject: Subject,
    pub matcher: Matcher,
}

impl Predicate {
    pub fn new(subject: Subject, matcher: Matcher) -> Self {
        Self { subject, matcher }
    }

    pub fn name_contains(s: &str) -> Self {
        Self::new(Subject::Name, Matcher::Contains(s.to_string()))
    }

    pub fn name_ends_with(s: &str) -> Self {
        Self::new(Subject::Name, Matcher::EndsWith(s.to_string()))
    }

    pub fn name_matches(pattern: &str) -> Result<Self> {
        Ok(Self::new(Subject::Name, Matcher::Regex(compile(pattern)?)))
    }

    pub fn path_contains(s: &str) -> Self {
        Self::new(Subject::Path, Matcher::Contains(s.to_string()))
    }

    pub fn path_ends_with(s: &str) -> Self {
        Self::new(Subject::Path, Matcher::EndsWith(s.to_string()))
    }

    pub fn path_matches(pattern: &str) -> Result<Self> {
        Ok(Self::new(Subject::Path, Matcher::Regex(compile(pattern)?)))
    }

    pub fn extension_matches(pattern: &str) -> Result<Self> {
        Ok(Self::new(Subject::Extension, Matcher::Regex(compile(pattern)?)))
    }

    pub fn content_contains(s: &str) -> Self {
        Self::new(Subject::Content, Matcher::Contains(s.to_string()))
    }

    pub fn content_matches(pattern: &str) -> Result<Self> {
        Ok(Self::new(Subject::Content, Matcher::Regex(compile(pattern)?)))
    }

    /// Keep only the highest-named file of each version family, where the
    /// family is the start of the name up to the end of the pattern's match
    pub fn latest_version(prefix_pattern: &str) -> Result<Self> {
        Ok(Self::new(
            Subject::LatestVersion,
            Matcher::Regex(compile(prefix_pattern)?),
        ))
    }

    pub fn accepts(&self, file: &dyn FileSubject) -> bool {
        match self.subject {
            Subject::Name => self.matcher.test(file.name()),
            Subject::Path => self.matcher.test(file.path()),
            Subject::Extension => self.matcher.test(file.extension()),
            Subject::Content => match file.content() {
                Some(text) => self.matcher.test(&WHITESPACE.replace_all(text, " ")),
                None => false,
            },
            Subject::LatestVersion => self.is_latest_version(file),
        }
    }

    /// A name outside any family passes. Otherwise the name must sort last
    /// among the siblings that share its prefix and carry an extension.
    fn is_latest_version(&self, file: &dyn FileSubject) -> bool {
        let name = file.name();
        let Some(end) = self.matcher.match_end(name) else {
            return true;
        };
        let prefix = &name[..end];
        let newer = file.siblings().into_iter().find(|other| {
            other.as_str() > name
                && other
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.rsplit_once('.'))
                    .map(|(_, ext)| !ext.is_empty())
                    .unwrap_or(false)
        });
        match newer {
            Some(other) => {
                tracing::debug!("Skipping '{}': '{}' is a later version", name, other);
                false
            }
            None => true,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.subject.label();
        match &self.matcher {
            Matcher::Contains(s) => write!(f, "{}*='{}'", label, s),
            Matcher::EndsWith(s) => write!(f, "{}$='{}'", label, s),
            Matcher::Regex(re) => write!(f, "{}~'{}'", label, re.as_str()),
        }
    }
}

// ============================================
// Filter tree
// ============================================

/// How a composite combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeOp {
    /// Every child accepts
    All,
    /// At least one child accepts
    Any,
    /// No child accepts
    None,
}

impl CompositeOp {
    /// Keyword used by the mini-language
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::All => "AND",
            Self::Any => "OR",
            Self::None => "NOT",
        }
    }
}

/// A file filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    Leaf(Predicate),
    Composite {
        op: CompositeOp,
        children: Vec<Filter>,
    },
}

impl Filter {
    pub fn all(children: Vec<Filter>) -> Self {
        Self::Composite {
            op: CompositeOp::All,
            children,
        }
    }

    pub fn any(children: Vec<Filter>) -> Self {
        Self::Composite {
            op: CompositeOp::Any,
            children,
        }
    }

    pub fn none(children: Vec<Filter>) -> Self {
        Self::Composite {
            op: CompositeOp::None,
            children,
        }
    }

    /// Filter that accepts every file
    pub fn accept_all() -> Self {
        Self::all(Vec::new())
    }

    pub fn accepts(&self, file: &dyn FileSubject) -> bool {
        match self {
            Self::Leaf(predicate) => predicate.accepts(file),
            Self::Composite { op, children } => match op {
                CompositeOp::All => children.iter().all(|c| c.accepts(file)),
                CompositeOp::Any => children.iter().any(|c| c.accepts(file)),
                CompositeOp::None => !children.iter().any(|c| c.accepts(file)),
            },
        }
    }
}

impl From<Predicate> for Filter {
    fn from(predicate: Predicate) -> Self {
        Self::Leaf(predicate)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(predicate) => write!(f, "{}", predicate),
            Self::Composite { op, children } => {
                write!(f, "{} [", op.keyword())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str("]")
            }
        }
    }
}
