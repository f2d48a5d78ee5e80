//! Corpus loading: turning a directory of assignments into submissions
//!
//! Every first-level entry of the corpus directory is one submission. A
//! directory contributes all regular files beneath it; a plain file is a
//! single-file submission named after the file without its extension,
//! unless another entry already claims that name, in which case it keeps
//! its full file name. Hidden entries are skipped at every level.
//!
//! Submissions whose selected sources are byte-for-byte identical, file by
//! file, are reported as exact duplicates and only the first is kept. File
//! paths do not take part, so a copy that only moved or renamed files is
//! still exact.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use ignore::WalkBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{AcError, Result};
use crate::filter::{DiskFile, FileSubject, Filter};

/// One selected source file
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    /// Path relative to the submission root
    pub path: PathBuf,
    #[serde(skip)]
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Path with `/` separators, as shown in reports and seen by filters
    pub fn display_path(&self) -> String {
        to_slash(&self.path)
    }
}

/// One participant's files; never modified once loaded
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: String,
    /// Where the submission was read from
    pub root: PathBuf,
    /// Selected files in path order
    pub files: Vec<SourceFile>,
}

impl Submission {
    pub fn new(id: impl Into<String>, files: Vec<SourceFile>) -> Self {
        let id = id.into();
        Self {
            root: PathBuf::from(&id),
            id,
            files,
        }
    }

    /// SHA-256 over the file contents, each prefixed with its byte length
    /// so that moving text across a file boundary changes the digest
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.files.len() as u64).to_le_bytes());
        for file in &self.files {
            hasher.update((file.content.len() as u64).to_le_bytes());
            hasher.update(file.content.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }
}

/// A submission dropped because another one has identical content
#[derive(Debug, Clone, Serialize)]
pub struct ExactDuplicate {
    pub kept: String,
    pub dropped: String,
    pub digest: String,
}

/// A file the filter accepted but that could not be used
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub submission: String,
    pub path: String,
    pub reason: String,
}

/// Submissions ready for analysis
#[derive(Debug, Clone, Default, Serialize)]
pub struct Corpus {
    pub submissions: Vec<Submission>,
    pub duplicates: Vec<ExactDuplicate>,
    pub skipped: Vec<SkippedFile>,
}

impl Corpus {
    /// Build a corpus from already-loaded submissions, removing exact duplicates
    pub fn from_submissions(submissions: Vec<Submission>) -> Self {
        let (submissions, duplicates) = remove_exact_duplicates(submissions);
        Self {
            submissions,
            duplicates,
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.submissions.iter().map(|s| s.files.len()).sum()
    }
}

/// Keep the first submission of every content digest
pub fn remove_exact_duplicates(
    submissions: Vec<Submission>,
) -> (Vec<Submission>, Vec<ExactDuplicate>) {
    let mut seen: AHashMap<String, String> = AHashMap::new();
    let mut kept = Vec::with_capacity(submissions.len());
    let mut duplicates = Vec::new();

    for submission in submissions {
        let digest = submission.digest();
        if let Some(first) = seen.get(&digest) {
            warn!(
                "Detected exact duplicate {}: '{}' ({}) matches '{}'",
                &digest[..12],
                submission.id,
                submission.root.display(),
                first
            );
            duplicates.push(ExactDuplicate {
                kept: first.clone(),
                dropped: submission.id,
                digest,
            });
        } else {
            seen.insert(digest, submission.id.clone());
            kept.push(submission);
        }
    }
    (kept, duplicates)
}

/// Reads a corpus directory
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    filter: Filter,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusLoader {
    pub fn new() -> Self {
        Self {
            filter: Filter::accept_all(),
        }
    }

    /// Only files the filter accepts become part of a submission
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn load(&self, dir: &Path) -> Result<Corpus> {
        if !dir.exists() {
            return Err(AcError::FileNotFound {
                path: dir.display().to_string(),
            });
        }
        if !dir.is_dir() {
            return Err(AcError::Config {
                message: format!("{} is not a directory", dir.display()),
            });
        }

        let mut submissions = Vec::new();
        let mut skipped = Vec::new();

        for (id, entry) in Self::submission_entries(dir)? {
            let files = self.select_files(&id, &entry, &mut skipped);
            if files.is_empty() {
                debug!("Submission {} has no selected files, skipping", id);
                continue;
            }
            submissions.push(Submission {
                id,
                root: entry,
                files,
            });
        }

        let (submissions, duplicates) = remove_exact_duplicates(submissions);
        info!(
            "Loaded {} submissions from {} ({} exact duplicates)",
            submissions.len(),
            dir.display(),
            duplicates.len()
        );

        Ok(Corpus {
            submissions,
            duplicates,
            skipped,
        })
    }

    /// First-level entries of a corpus directory with their submission ids,
    /// in path order.
    ///
    /// Fails with [`AcError::Config`] if two entries still share an id after
    /// plain files that collide fall back to their full names.
    pub fn submission_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let mut entries: Vec<(PathBuf, String, bool)> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| !is_hidden(p))
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?.to_string();
                let is_dir = p.is_dir();
                Some((p, name, is_dir))
            })
            .collect();
        entries.sort();

        let short_name = |name: &str, is_dir: bool| -> String {
            if is_dir {
                name.to_string()
            } else {
                strip_extension(name).to_string()
            }
        };

        let mut claims: AHashMap<String, usize> = AHashMap::new();
        for (_, name, is_dir) in &entries {
            *claims.entry(short_name(name, *is_dir)).or_default() += 1;
        }

        let mut seen: AHashMap<String, PathBuf> = AHashMap::new();
        let mut named = Vec::with_capacity(entries.len());
        for (path, name, is_dir) in entries {
            let short = short_name(&name, is_dir);
            let id = if claims.get(&short).copied().unwrap_or(0) > 1 && !is_dir {
                warn!(
                    "Submission name '{}' is taken by more than one entry, using '{}'",
                    short, name
                );
                name
            } else {
                short
            };

            if let Some(other) = seen.get(&id) {
                return Err(AcError::Config {
                    message: format!(
                        "{} and {} would both be submission '{}'; rename one of them",
                        other.display(),
                        path.display(),
                        id
                    ),
                });
            }
            seen.insert(id.clone(), path.clone());
            named.push((id, path));
        }
        Ok(named)
    }

    /// Every non-hidden file of one submission; content is read lazily
    pub fn candidates(&self, root: &Path) -> Vec<DiskFile> {
        if root.is_file() {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return vec![DiskFile::new(name, root)];
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        builder
            .build()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| {
                let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
                Some(DiskFile::new(to_slash(&relative), e.path()))
            })
            .collect()
    }

    /// Relative paths the filter accepts, for previewing a filter
    pub fn preview(&self, root: &Path) -> Vec<String> {
        self.candidates(root)
            .into_iter()
            .filter(|f| self.filter.accepts(f))
            .map(|f| f.path().to_string())
            .collect()
    }

    fn select_files(
        &self,
        id: &str,
        root: &Path,
        skipped: &mut Vec<SkippedFile>,
    ) -> Vec<SourceFile> {
        let mut files = Vec::new();
        for candidate in self.candidates(root) {
            if !self.filter.accepts(&candidate) {
                continue;
            }
            let path = candidate.path().to_string();
            match candidate.into_content() {
                Some(content) => files.push(SourceFile::new(path, content)),
                None => {
                    warn!("Skipping {}/{}: not readable as UTF-8 text", id, path);
                    skipped.push(SkippedFile {
                        submission: id.to_string(),
                        path,
                        reason: "not readable as UTF-8 text".to_string(),
                    });
                }
            }
        }
        files
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
