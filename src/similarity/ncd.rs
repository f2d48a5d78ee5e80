//! Normalized compression distance between submissions
//!
//! For streams A and B with compressed sizes `a` and `b`, and `c` the
//! compressed size of their concatenation:
//!
//! ```text
//! d(A, B) = (c - min(a, b)) / max(a, b)
//! ```
//!
//! clamped to `[0, 1]`. Small values mean one stream adds little
//! information to the other. The concatenation always puts the
//! lexicographically smaller stream first so `d(A, B) == d(B, A)` exactly.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::Compressor;
use crate::error::Result;

/// Distance between two submissions; `a` precedes `b` in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceResult {
    pub a: String,
    pub b: String,
    pub distance: f64,
}

impl DistanceResult {
    fn sort_key(&self) -> (OrderedFloat<f64>, &str, &str) {
        (OrderedFloat(self.distance), &self.a, &self.b)
    }
}

/// Sort ascending by distance, ties by submission ids
pub fn sort_results(results: &mut [DistanceResult]) {
    results.sort_by(|x, y| x.sort_key().cmp(&y.sort_key()));
}

/// Whether a computation ran to completion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "lowercase")]
pub enum Outcome<T> {
    Complete(T),
    /// Stopped early; holds whatever finished before the stop
    Cancelled(T),
}

impl<T> Outcome<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Complete(v) | Self::Cancelled(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Complete(v) | Self::Cancelled(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Complete(v) => Outcome::Complete(f(v)),
            Self::Cancelled(v) => Outcome::Cancelled(f(v)),
        }
    }
}

/// Shared flag checked between tasks
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Called with (finished, total) as tasks complete, from worker threads
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Pairwise NCD over a set of byte streams
pub struct NcdEngine {
    compressor: Arc<dyn Compressor>,
    cancel: CancellationToken,
    progress: Option<ProgressFn>,
}

impl NcdEngine {
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        Self {
            compressor,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn compressor_name(&self) -> &str {
        self.compressor.name()
    }

    /// Distance between two streams, compressing each of them
    pub fn distance(&self, a: &[u8], b: &[u8]) -> Result<f64> {
        let ca = self.compressor.compressed_size(a)?;
        let cb = self.compressor.compressed_size(b)?;
        self.distance_with_sizes(a, ca, b, cb)
    }

    /// Distance when the individual compressed sizes are already known
    fn distance_with_sizes(&self, a: &[u8], ca: usize, b: &[u8], cb: usize) -> Result<f64> {
        if a == b {
            return Ok(0.0);
        }

        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut joined = Vec::with_capacity(a.len() + b.len());
        joined.extend_from_slice(first);
        joined.extend_from_slice(second);
        let c = self.compressor.compressed_size(&joined)?;

        let m = ca.min(cb);
        let big = ca.max(cb);
        if big == 0 {
            return Ok(0.0);
        }
        let d = (c as f64 - m as f64) / big as f64;
        Ok(d.clamp(0.0, 1.0))
    }

    /// Distances for every unordered pair of `items`, sorted ascending.
    ///
    /// Each stream is compressed once; pairs are then computed in parallel.
    /// The cancellation token is checked before every task, and a run that
    /// stops early returns [`Outcome::Cancelled`] with the pairs it finished.
    pub fn pairwise(&self, items: &[(String, Vec<u8>)]) -> Result<Outcome<Vec<DistanceResult>>> {
        let n = items.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let total = pairs.len();
        info!(
            "Computing {} pairwise distances with {}",
            total,
            self.compressor.name()
        );

        if self.cancel.is_cancelled() {
            return Ok(Outcome::Cancelled(Vec::new()));
        }

        let sizes: Vec<usize> = items
            .par_iter()
            .map(|(_, data)| self.compressor.compressed_size(data))
            .collect::<Result<_>>()?;

        let done = AtomicUsize::new(0);
        let computed: Vec<Option<DistanceResult>> = pairs
            .par_iter()
            .map(|&(i, j)| -> Result<Option<DistanceResult>> {
                if self.cancel.is_cancelled() {
                    return Ok(None);
                }
                let (id_a, data_a) = &items[i];
                let (id_b, data_b) = &items[j];
                let distance = self.distance_with_sizes(data_a, sizes[i], data_b, sizes[j])?;
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(progress) = &self.progress {
                    progress(finished, total);
                }
                Ok(Some(DistanceResult {
                    a: id_a.clone(),
                    b: id_b.clone(),
                    distance,
                }))
            })
            .collect::<Result<_>>()?;

        let mut results: Vec<DistanceResult> = computed.into_iter().flatten().collect();
        sort_results(&mut results);

        if results.len() < total {
            debug!("Cancelled after {} of {} pairs", results.len(), total);
            Ok(Outcome::Cancelled(results))
        } else {
            Ok(Outcome::Complete(results))
        }
    }
}
