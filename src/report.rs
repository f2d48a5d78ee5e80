//! Analysis report and its renderers

use serde::Serialize;

use crate::corpus::{ExactDuplicate, SkippedFile};
use crate::error::{AcError, Result};
use crate::tokenizer::registry::VoteSummary;

/// A file that was dropped from comparison because it failed to tokenize
#[derive(Debug, Clone, Serialize)]
pub struct FileWarning {
    pub submission: String,
    pub path: String,
    pub message: String,
}

/// Scores for one pair of submissions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScore {
    pub a: String,
    pub b: String,
    /// Normalized compression distance in `[0, 1]`
    pub distance: f64,
    /// Token-count distance in `[0, 1]`
    pub token_distance: f64,
    /// `distance` scaled down when the pair stands out from both
    /// submissions' other distances
    pub adjusted_distance: f64,
    /// NCD over the two submissions' comments; absent when either has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_distance: Option<f64>,
}

/// Where one copy of a fragment sits
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FragmentOccurrence {
    pub submission: String,
    pub path: String,
    /// Byte range in the original file (or in the token stream for
    /// canonical fragments)
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`, when the range refers to the original file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Text shared by only a few submissions
#[derive(Debug, Clone, Serialize)]
pub struct Fragment {
    pub text: String,
    /// Length in characters
    pub length: usize,
    pub submissions: Vec<String>,
    pub occurrences: Vec<FragmentOccurrence>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub tokenizer: VoteSummary,
    pub compressor: String,
    /// What was compressed: tokens, raw or raw_collapsed
    pub input: String,
    /// Submissions that took part in the comparison
    pub submissions: usize,
    pub warnings: Vec<FileWarning>,
    pub duplicates: Vec<ExactDuplicate>,
    pub skipped: Vec<SkippedFile>,
    /// Ascending by distance
    pub distances: Vec<PairScore>,
    pub fragments: Vec<Fragment>,
    /// False when the run was cancelled; distances are then partial
    pub complete: bool,
}

impl AnalysisReport {
    /// Most similar pairs first, at most `n` of them
    pub fn top(&self, n: usize) -> &[PairScore] {
        &self.distances[..n.min(self.distances.len())]
    }

    /// Copy of the report keeping only the `n` closest pairs
    pub fn truncated(&self, n: Option<usize>) -> Self {
        let mut report = self.clone();
        if let Some(n) = n {
            report.distances.truncate(n);
        }
        report
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AcError::Config {
            message: format!("JSON serialization failed: {}", e),
        })
    }
}

/// Format the report as text
pub fn format_report(report: &AnalysisReport, top: Option<usize>) -> String {
    let mut output = String::new();

    output.push_str("╔══════════════════════════════════════════════════════════════════╗\n");
    output.push_str("║                     SUBMISSION SIMILARITY REPORT                 ║\n");
    output.push_str("╚══════════════════════════════════════════════════════════════════╝\n\n");

    output.push_str("── OVERVIEW ─────────────────────────────────────────────────────────\n");
    output.push_str(&format!("  Submissions:       {:>6}\n", report.submissions));
    output.push_str(&format!("  Pairs compared:    {:>6}\n", report.distances.len()));
    output.push_str(&format!("  Exact duplicates:  {:>6}\n", report.duplicates.len()));
    output.push_str(&format!(
        "  Tokenizer:         {}{}\n",
        report.tokenizer.tokenizer,
        if report.tokenizer.is_fallback {
            " (fallback)"
        } else {
            ""
        }
    ));
    output.push_str(&format!(
        "  Compressor:        {} over {}\n",
        report.compressor, report.input
    ));
    if !report.complete {
        output.push_str("  ⚠ Run was cancelled; results are partial\n");
    }
    output.push('\n');

    if !report.duplicates.is_empty() {
        output.push_str("── EXACT DUPLICATES ─────────────────────────────────────────────────\n");
        for dup in &report.duplicates {
            output.push_str(&format!(
                "  {} = {}  ({})\n",
                dup.dropped,
                dup.kept,
                &dup.digest[..12.min(dup.digest.len())]
            ));
        }
        output.push('\n');
    }

    output.push_str("── CLOSEST PAIRS ────────────────────────────────────────────────────\n");
    output.push_str("  Distance  Adjusted  Tokens  Comments  Submissions\n");
    output.push_str("  ─────────────────────────────────────────────────────────────────\n");
    let shown = match top {
        Some(n) => report.top(n),
        None => &report.distances[..],
    };
    for pair in shown {
        let comments = pair
            .comment_distance
            .map(|d| format!("{:.3}", d))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "  {:>8.4}  {:>8.4}  {:>6.3}  {:>8}  {} ↔ {}\n",
            pair.distance, pair.adjusted_distance, pair.token_distance, comments, pair.a, pair.b
        ));
    }
    if shown.len() < report.distances.len() {
        output.push_str(&format!(
            "  ... {} more pairs\n",
            report.distances.len() - shown.len()
        ));
    }
    output.push('\n');

    if !report.fragments.is_empty() {
        output.push_str("── RARE FRAGMENTS ───────────────────────────────────────────────────\n");
        for fragment in &report.fragments {
            output.push_str(&format!(
                "  \"{}\" ({} chars, {})\n",
                fragment.text.escape_debug(),
                fragment.length,
                fragment.submissions.join(", ")
            ));
            for occ in &fragment.occurrences {
                match occ.line {
                    Some(line) => output.push_str(&format!(
                        "    {}/{}:{}  bytes {}..{}\n",
                        occ.submission, occ.path, line, occ.start, occ.end
                    )),
                    None => output.push_str(&format!(
                        "    {}/{}  stream {}..{}\n",
                        occ.submission, occ.path, occ.start, occ.end
                    )),
                }
            }
        }
        output.push('\n');
    }

    if !report.warnings.is_empty() || !report.skipped.is_empty() {
        output.push_str("── WARNINGS ─────────────────────────────────────────────────────────\n");
        for w in &report.warnings {
            output.push_str(&format!("  {}/{}: {}\n", w.submission, w.path, w.message));
        }
        for s in &report.skipped {
            output.push_str(&format!("  {}/{}: {}\n", s.submission, s.path, s.reason));
        }
        output.push('\n');
    }

    output
}
