//! End-to-end analysis of a loaded corpus
//!
//! # Architecture
//!
//! 1. One tokenizer is chosen for the corpus, by vote or by configuration.
//! 2. Every file is tokenized in parallel; a file that fails is reported
//!    as a warning and left out. Comments are gathered on the way.
//! 3. Each submission's streams are joined and compared pairwise with NCD.
//!    Every pair also gets the token-count distance, an outlier-adjusted
//!    distance and, when both sides have comments, the NCD of the comments.
//! 4. Optionally, every file is indexed in a [`SubstringIndex`] and
//!    fragments shared by few submissions are mapped back to file offsets.

use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, FragmentSource, NcdInput};
use crate::corpus::{Corpus, SourceFile, Submission};
use crate::error::Result;
use crate::offset_map::OffsetMapper;
use crate::ptrie::SubstringIndex;
use crate::report::{AnalysisReport, FileWarning, Fragment, FragmentOccurrence, PairScore};
use crate::similarity::{
    outlier_adjusted, token_count_distance, CancellationToken, DistanceResult, NcdEngine,
    Outcome, ProgressFn,
};
use crate::tokenizer::registry::VoteSummary;
use crate::tokenizer::{CanonicalStream, Selection, TokenizerRegistry, TokenizerSelector};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tokenized view of one submission
struct TokenizedSubmission<'c> {
    submission: &'c Submission,
    /// Successfully tokenized files with their streams
    files: Vec<(&'c SourceFile, CanonicalStream)>,
    joined: CanonicalStream,
    /// Comments of the tokenized files, one per line
    comments: String,
}

/// Submissions that took part and warnings for the files left out
type Tokenized<'c> = (Vec<TokenizedSubmission<'c>>, Vec<FileWarning>);

type CommentDistances = AHashMap<(String, String), f64>;

/// Runs the analysis pipeline over a corpus
pub struct Analyzer {
    config: AnalysisConfig,
    registry: TokenizerRegistry,
    cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            registry: TokenizerRegistry::builtin(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_registry(mut self, registry: TokenizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Progress callback for the pairwise phase
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The configured language if any, otherwise the corpus vote
    pub fn select_tokenizer(&self, corpus: &Corpus) -> Result<Selection> {
        if let Some(name) = &self.config.tokenizer.language {
            let tokenizer = self.registry.for_language(name)?;
            let files = corpus.file_count();
            return Ok(Selection {
                is_fallback: tokenizer.name() == self.registry.null().name(),
                votes: vec![(tokenizer.name().to_string(), files)],
                tokenizer,
            });
        }
        TokenizerSelector::new(&self.registry)
            .with_fallback(self.config.tokenizer.allow_fallback)
            .choose(&corpus.submissions)
    }

    pub fn run(&self, corpus: &Corpus) -> Result<AnalysisReport> {
        let selection = self.select_tokenizer(corpus)?;
        info!(
            "Analyzing {} submissions ({} files) with the {} tokenizer",
            corpus.len(),
            corpus.file_count(),
            selection.tokenizer.name()
        );

        let tokenization = self.tokenize_corpus(&selection, corpus)?;
        let tokenized_all = tokenization.is_complete();
        let (tokenized, warnings) = tokenization.into_inner();

        let mut engine = self.engine().with_cancellation(self.cancel.clone());
        if let Some(progress) = &self.progress {
            engine = engine.with_progress(Arc::clone(progress));
        }
        let outcome = if tokenized_all {
            engine.pairwise(&self.ncd_inputs(&tokenized))?
        } else {
            info!("Cancelled during tokenization, skipping comparison");
            Outcome::Cancelled(Vec::new())
        };
        let mut complete = outcome.is_complete();

        let comments = if complete && self.config.scores.comments {
            let comments = self.comment_distances(&tokenized)?;
            complete = comments.is_complete();
            comments.into_inner()
        } else {
            CommentDistances::new()
        };
        let distances = self.score_pairs(outcome.into_inner(), &tokenized, &comments);

        let fragments = if self.config.fragments.enabled && complete {
            self.find_fragments(&tokenized)?
        } else {
            Vec::new()
        };

        Ok(AnalysisReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            tokenizer: VoteSummary::from(&selection),
            compressor: engine.compressor_name().to_string(),
            input: self.config.ncd.input.name().to_string(),
            submissions: tokenized.len(),
            warnings,
            duplicates: corpus.duplicates.clone(),
            skipped: corpus.skipped.clone(),
            distances,
            fragments,
            complete,
        })
    }

    // ============================================
    // Tokenization
    // ============================================

    /// Submissions not yet started when the token is cancelled are left
    /// out, and the outcome is then `Cancelled`
    fn tokenize_corpus<'c>(
        &self,
        selection: &Selection,
        corpus: &'c Corpus,
    ) -> Result<Outcome<Tokenized<'c>>> {
        let tokenizer = &selection.tokenizer;
        let separator = &self.config.ncd.separator;
        let with_comments = self.config.scores.comments;

        let per_submission: Vec<Option<(TokenizedSubmission<'c>, Vec<FileWarning>)>> = corpus
            .submissions
            .par_iter()
            .map(|submission| {
                if self.cancel.is_cancelled() {
                    return Ok(None);
                }
                let mut files = Vec::with_capacity(submission.files.len());
                let mut comments = Vec::new();
                let mut warnings = Vec::new();
                for file in &submission.files {
                    let path = file.display_path();
                    match tokenizer.tokenize(&file.content) {
                        Ok(stream) => {
                            if with_comments {
                                match tokenizer.comments(&file.content) {
                                    Ok(text) if !text.is_empty() => comments.push(text),
                                    Ok(_) => {}
                                    Err(e) => {
                                        debug!("{}/{}: no comments: {}", submission.id, path, e)
                                    }
                                }
                            }
                            files.push((file, stream));
                        }
                        Err(e) if e.is_recoverable() => {
                            let e = e.in_file(&path);
                            warn!("{}: {}", submission.id, e);
                            warnings.push(FileWarning {
                                submission: submission.id.clone(),
                                path,
                                message: e.to_string(),
                            });
                        }
                        Err(e) => return Err(e),
                    }
                }

                let mut joined = CanonicalStream::default();
                for (_, stream) in &files {
                    joined.extend(stream, separator);
                }
                Ok(Some((
                    TokenizedSubmission {
                        submission,
                        files,
                        joined,
                        comments: comments.join("\n"),
                    },
                    warnings,
                )))
            })
            .collect::<Result<_>>()?;

        let total = per_submission.len();
        let per_submission: Vec<_> = per_submission.into_iter().flatten().collect();
        let finished = per_submission.len() == total;

        let mut tokenized = Vec::with_capacity(per_submission.len());
        let mut warnings = Vec::new();
        for (entry, file_warnings) in per_submission {
            warnings.extend(file_warnings);
            if entry.files.is_empty() {
                warn!(
                    "Submission {} has no tokenizable files, leaving it out of the comparison",
                    entry.submission.id
                );
                continue;
            }
            tokenized.push(entry);
        }

        if finished {
            Ok(Outcome::Complete((tokenized, warnings)))
        } else {
            debug!(
                "Tokenized {} of {} submissions before cancellation",
                tokenized.len(),
                total
            );
            Ok(Outcome::Cancelled((tokenized, warnings)))
        }
    }

    // ============================================
    // Distances
    // ============================================

    fn engine(&self) -> NcdEngine {
        NcdEngine::new(self.config.ncd.compressor.build(self.config.ncd.level))
    }

    fn ncd_inputs(&self, tokenized: &[TokenizedSubmission<'_>]) -> Vec<(String, Vec<u8>)> {
        let separator = &self.config.ncd.separator;
        tokenized
            .iter()
            .map(|t| {
                let bytes = match self.config.ncd.input {
                    NcdInput::Tokens => t.joined.as_str().as_bytes().to_vec(),
                    NcdInput::Raw => join_sources(t, separator, |s| s.to_string()),
                    NcdInput::RawCollapsed => join_sources(t, separator, |s| {
                        WHITESPACE.replace_all(s, " ").into_owned()
                    }),
                };
                (t.submission.id.clone(), bytes)
            })
            .collect()
    }

    /// NCD between the comments of every two submissions that have any
    fn comment_distances(
        &self,
        tokenized: &[TokenizedSubmission<'_>],
    ) -> Result<Outcome<CommentDistances>> {
        let items: Vec<(String, Vec<u8>)> = tokenized
            .iter()
            .filter(|t| !t.comments.is_empty())
            .map(|t| (t.submission.id.clone(), t.comments.as_bytes().to_vec()))
            .collect();
        debug!("{} submissions have comments", items.len());

        let outcome = self
            .engine()
            .with_cancellation(self.cancel.clone())
            .pairwise(&items)?;
        Ok(outcome.map(|results| {
            results
                .into_iter()
                .map(|r| ((r.a, r.b), r.distance))
                .collect()
        }))
    }

    fn score_pairs(
        &self,
        results: Vec<DistanceResult>,
        tokenized: &[TokenizedSubmission<'_>],
        comments: &CommentDistances,
    ) -> Vec<PairScore> {
        let streams: AHashMap<&str, &CanonicalStream> = tokenized
            .iter()
            .map(|t| (t.submission.id.as_str(), &t.joined))
            .collect();
        let adjusted = outlier_adjusted(&results, self.config.scores.outlier_importance);

        results
            .into_par_iter()
            .zip(adjusted)
            .map(|(r, adjusted_distance)| {
                let token_distance = match (streams.get(r.a.as_str()), streams.get(r.b.as_str())) {
                    (Some(a), Some(b)) => token_count_distance(a, b),
                    _ => 1.0,
                };
                let comment_distance = comments
                    .get(&(r.a.clone(), r.b.clone()))
                    .or_else(|| comments.get(&(r.b.clone(), r.a.clone())))
                    .copied();
                PairScore {
                    a: r.a,
                    b: r.b,
                    distance: r.distance,
                    token_distance,
                    adjusted_distance,
                    comment_distance,
                }
            })
            .collect()
    }

    // ============================================
    // Fragments
    // ============================================

    fn find_fragments(&self, tokenized: &[TokenizedSubmission<'_>]) -> Result<Vec<Fragment>> {
        let settings = &self.config.fragments;
        let mut index = SubstringIndex::new(settings.min_len);
        let mut docs: Vec<IndexedFile<'_>> = Vec::new();

        for t in tokenized {
            for (file, stream) in &t.files {
                let (text, mapper) = match settings.source {
                    FragmentSource::Normalized => {
                        let mapper = OffsetMapper::new(&file.content, &WHITESPACE, " ");
                        (mapper.normalized().to_string(), Some(mapper))
                    }
                    FragmentSource::Canonical => (stream.as_str().to_string(), None),
                };
                let doc = index.insert(&text, &t.submission.id, Some(settings.max_len));
                debug_assert_eq!(doc, docs.len());
                docs.push(IndexedFile {
                    submission: &t.submission.id,
                    file,
                    text,
                    mapper,
                });
            }
        }
        info!(
            "Indexed {} files into {} trie nodes",
            docs.len(),
            index.node_count()
        );

        let mut candidates: Vec<(usize, String, usize)> = Vec::new();
        for node in index.find_rare(settings.min_submissions, settings.max_submissions) {
            let depth = index.depth(node);
            if depth < settings.min_len || !index.is_maximal(node)? {
                continue;
            }
            candidates.push((depth, index.string(node), node));
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        debug!("{} maximal rare candidates", candidates.len());

        let mut fragments: Vec<Fragment> = Vec::new();
        for (length, text, node) in candidates {
            if fragments.len() >= settings.max_reported {
                break;
            }
            if fragments.iter().any(|f| f.text.contains(&text)) {
                continue;
            }

            let mut occurrences = Vec::new();
            for loc in index.locations(node) {
                let doc = &docs[loc.doc];
                occurrences.push(doc.occurrence(loc.offset, length)?);
            }
            occurrences.sort();
            occurrences.dedup();

            fragments.push(Fragment {
                text,
                length,
                submissions: index.submissions_under(node),
                occurrences,
            });
        }

        info!("Found {} rare fragments", fragments.len());
        Ok(fragments)
    }
}

/// A file as it was inserted into the substring index
struct IndexedFile<'c> {
    submission: &'c str,
    file: &'c SourceFile,
    /// The text that was indexed
    text: String,
    /// Present when `text` is normalized source
    mapper: Option<OffsetMapper>,
}

impl IndexedFile<'_> {
    /// Occurrence of `length` characters starting at char `offset` of the
    /// indexed text
    fn occurrence(&self, offset: usize, length: usize) -> Result<FragmentOccurrence> {
        let start = char_to_byte(&self.text, offset);
        let end = char_to_byte(&self.text, offset + length);

        let (start, end, line) = match &self.mapper {
            Some(mapper) => {
                let source_start = mapper.rmap(start, false)?;
                let source_end = mapper.rmap(end, true)?.max(source_start);

                // Whitespace at either end is not part of the evidence
                let content = &self.file.content;
                let slice = &content[source_start..source_end];
                let trimmed_start = source_end - slice.trim_start().len();
                let trimmed_end = (source_start + slice.trim_end().len()).max(trimmed_start);

                let line = content[..trimmed_start].matches('\n').count() + 1;
                (trimmed_start, trimmed_end, Some(line))
            }
            None => (start, end, None),
        };

        Ok(FragmentOccurrence {
            submission: self.submission.to_string(),
            path: self.file.display_path(),
            start,
            end,
            line,
        })
    }
}

fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn join_sources(
    t: &TokenizedSubmission<'_>,
    separator: &str,
    transform: impl Fn(&str) -> String,
) -> Vec<u8> {
    t.files
        .iter()
        .map(|(file, _)| transform(&file.content))
        .collect::<Vec<_>>()
        .join(separator)
        .into_bytes()
}
