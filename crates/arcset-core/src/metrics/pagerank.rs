//! Parallel PageRank used to rank line-graph vertices (source edges).
//!
//! # Algorithm
//!
//! Plain power iteration without damping or teleportation:
//!
//! ```text
//! PR₀(v)   = 1 / N
//! PRₜ₊₁(v) = Σ PRₜ(u) / out_degree(u)   for each u → v
//! ```
//!
//! Line graphs of strongly connected components have no dangling vertices,
//! so the walk is well defined; a zero out-degree contributes nothing.
//! Iteration stops after `max_iter` rounds or once the L1 distance between
//! consecutive vectors drops below `tolerance`.
//!
//! # Parallelism
//!
//! The vertex range is split into contiguous, equal-sized chunks (the last
//! chunk absorbs the remainder), one per worker. Inside a round every worker
//! reads the frozen previous vector and writes only its own chunk of the
//! next one, so no locking is needed. Workers are scoped threads joined at
//! the end of each round, which doubles as the barrier between rounds.
//! A panicking worker surfaces as [`FasError::WorkerPanicked`] and the
//! partially written vector is discarded.

#![allow(clippy::cast_precision_loss)]

use std::num::NonZeroUsize;
use std::ops::Range;
use std::thread;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::error::FasError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Convergence threshold: stop when L1 norm of rank delta < tolerance.
    /// Default: 1e-6.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 5.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Worker threads per round; `0` means one per available core.
    #[serde(default)]
    pub workers: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
            workers: 0,
        }
    }
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_max_iter() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of a PageRank computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// Score per vertex, indexed by `NodeIndex::index()`.
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the L1 delta fell below the tolerance within `max_iter`.
    pub converged: bool,
    /// Number of worker chunks the vertex range was split into.
    pub workers: usize,
}

impl PageRankResult {
    /// Index of the highest score; the first one wins on ties.
    #[must_use]
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &score) in self.scores.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Compute PageRank over every vertex of `graph`.
///
/// # Errors
///
/// Returns [`FasError::WorkerPanicked`] if a worker thread panics.
#[instrument(skip(graph, config), fields(n = graph.node_count()))]
pub fn pagerank<N: Sync, E: Sync>(
    graph: &DiGraph<N, E>,
    config: &PageRankConfig,
) -> Result<PageRankResult, FasError> {
    let n = graph.node_count();

    if n == 0 {
        return Ok(PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
            workers: 0,
        });
    }

    let ranges = partition_ranges(n, resolve_workers(config.workers));
    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|v| graph.neighbors_directed(v, Direction::Outgoing).count())
        .collect();

    // Initialize ranks uniformly.
    let mut ranks = vec![1.0 / n as f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..config.max_iter {
        iterations += 1;

        let previous = &ranks;
        run_round(&mut new_ranks, &ranges, &|start: usize, chunk: &mut [f64]| {
            update_range(graph, &out_degree, previous, start, chunk);
        })?;

        // Check convergence: L1 norm of delta.
        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);
        trace!(iteration = iterations, delta, "pagerank round");

        if delta < config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(PageRankResult {
        scores: ranks,
        iterations,
        converged,
        workers: ranges.len(),
    })
}

/// Number of workers for a requested count (`0` = available parallelism).
#[must_use]
pub fn resolve_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Split `0..n` into at most `workers` contiguous chunks of `n / workers`
/// vertices; the last chunk takes the remainder. Never returns an empty chunk
/// unless `n == 0`.
#[must_use]
pub fn partition_ranges(n: usize, workers: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, n);
    let per_worker = n / workers;
    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i == workers - 1 { n } else { start + per_worker };
            start..end
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Fill `next` by running `update(range.start, chunk)` for every range, one
/// scoped thread per range. A single range runs on the calling thread.
fn run_round<F>(next: &mut [f64], ranges: &[Range<usize>], update: &F) -> Result<(), FasError>
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    if ranges.len() <= 1 {
        update(0, next);
        return Ok(());
    }

    thread::scope(|s| {
        let mut rest: &mut [f64] = next;
        let mut handles = Vec::with_capacity(ranges.len());

        for range in ranges {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            rest = tail;
            let start = range.start;
            handles.push(s.spawn(move || update(start, chunk)));
        }

        // Join every worker before reporting, so none is left running.
        let mut failed = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() && failed.is_none() {
                failed = Some(worker);
            }
        }
        failed.map_or(Ok(()), |worker| Err(FasError::WorkerPanicked { worker }))
    })
}

/// Write the next score of vertices `start..start + chunk.len()` into `chunk`.
fn update_range<N, E>(
    graph: &DiGraph<N, E>,
    out_degree: &[usize],
    previous: &[f64],
    start: usize,
    chunk: &mut [f64],
) {
    for (offset, slot) in chunk.iter_mut().enumerate() {
        let v = NodeIndex::new(start + offset);
        let mut rank_sum = 0.0;
        for u in graph.neighbors_directed(v, Direction::Incoming) {
            let degree = out_degree[u.index()];
            if degree > 0 {
                rank_sum += previous[u.index()] / degree as f64;
            }
        }
        *slot = rank_sum;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
