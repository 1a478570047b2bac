//! Feedback arc set strategies and the dispatch context that selects one.
//!
//! # Overview
//!
//! - [`pagerank_fas::PageRankFas`] (default): repeatedly decompose into SCCs,
//!   rank each component's edges by line-graph PageRank and cut the top edge
//!   of every non-trivial component until no cycle is left.
//! - [`sort_fas::SortFas`]: single-pass insertion ordering; every arc that
//!   points backwards in the final vertex order is cut.
//!
//! Both strategies remove the arcs they select from the graph, so on return
//! the graph is acyclic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::FasConfig;
use crate::error::FasError;
use crate::graph::build::{EdgePair, FasGraph};

pub mod pagerank_fas;
pub mod sort_fas;

pub use pagerank_fas::PageRankFas;
pub use sort_fas::SortFas;

/// A feedback arc set heuristic.
pub trait FasStrategy {
    /// Compute a feedback arc set for `graph`, removing the selected arcs
    /// from it.
    ///
    /// # Errors
    ///
    /// Implementations return [`FasError`] only for infrastructure failures
    /// (e.g. a panicked worker thread); the heuristics themselves always
    /// terminate on a finite graph.
    fn feedback_arc_set(&self, graph: &mut FasGraph) -> Result<FasResult, FasError>;
}

/// Which strategy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// SCC + line-graph PageRank (iterative edge cutting).
    #[default]
    PageRank,
    /// Insertion-sort vertex ordering (SortFAS).
    Sort,
}

impl StrategyKind {
    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageRank => "pagerank",
            Self::Sort => "sort",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pagerank" | "pagerank-fas" | "pr" => Ok(Self::PageRank),
            "sort" | "sortfas" | "sort-fas" => Ok(Self::Sort),
            other => Err(format!(
                "unknown strategy '{other}': expected one of: pagerank, sort"
            )),
        }
    }
}

/// Output of a strategy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FasResult {
    /// Selected arcs in the order they were removed.
    pub arcs: Vec<EdgePair>,
    /// Outer rounds performed (one per cycle check that found a cycle);
    /// always 0 for single-pass strategies.
    pub rounds: usize,
    /// Strategy that produced the set.
    pub strategy: StrategyKind,
}

impl FasResult {
    /// Number of arcs in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Return `true` if the input was already acyclic.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

/// Selects a strategy and runs it.
#[derive(Debug, Clone, Default)]
pub struct FasContext {
    kind: StrategyKind,
    config: FasConfig,
}

impl FasContext {
    /// Create a context running `kind` with `config`.
    #[must_use]
    pub const fn new(kind: StrategyKind, config: FasConfig) -> Self {
        Self { kind, config }
    }

    /// Strategy this context dispatches to.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Run the selected strategy on `graph`.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's [`FasError`].
    #[instrument(skip(self, graph), fields(strategy = %self.kind))]
    pub fn feedback_arc_set(&self, graph: &mut FasGraph) -> Result<FasResult, FasError> {
        match self.kind {
            StrategyKind::PageRank => PageRankFas::new(self.config.clone()).feedback_arc_set(graph),
            StrategyKind::Sort => SortFas.feedback_arc_set(graph),
        }
    }
}
