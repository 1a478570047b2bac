//! PageRank-driven feedback arc set solver.
//!
//! # Algorithm
//!
//! ```text
//! Checking ──cyclic──▶ Decomposing ──▶ Cutting ──▶ Checking
//!    │
//!    └─acyclic──▶ Done
//! ```
//!
//! - **Checking**: [`is_cyclic`] decides whether another round is needed.
//! - **Decomposing**: Tarjan SCCs are recomputed from scratch, since the cuts
//!   of the previous round may have split components.
//! - **Cutting**: for every component with more than one vertex, build its
//!   line graph, score it with PageRank and remove the single top-scored
//!   edge (first index on ties). One edge per component per round, not one
//!   per round overall.
//!
//! Every non-trivial component has at least one internal edge, so each round
//! removes at least one edge and the loop ends after at most `E` rounds.
//!
//! Self-loops are one-vertex cycles that Tarjan reports as trivial
//! components; they are moved into the result before the first round.

use std::time::Instant;

use petgraph::graph::NodeIndex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use crate::config::FasConfig;
use crate::error::FasError;
use crate::graph::build::{EdgePair, FasGraph};
use crate::graph::cycles::is_cyclic;
use crate::graph::line::LineGraph;
use crate::graph::scc::{SccPartition, strongly_connected_components};
use crate::metrics::pagerank::pagerank;
use crate::solver::{FasResult, FasStrategy, StrategyKind};

/// Solver state between steps of the outer loop.
#[derive(Debug)]
enum Phase {
    Checking,
    Decomposing,
    Cutting(SccPartition),
    Done,
}

/// The PageRank FAS heuristic.
#[derive(Debug, Clone, Default)]
pub struct PageRankFas {
    config: FasConfig,
}

impl PageRankFas {
    /// Create a solver with the given seed, scorer and progress settings.
    #[must_use]
    pub const fn new(config: FasConfig) -> Self {
        Self { config }
    }

    /// Settings this solver runs with.
    #[must_use]
    pub const fn config(&self) -> &FasConfig {
        &self.config
    }

    /// Score one component's line graph and remove its top edge.
    fn cut_component(
        &self,
        graph: &mut FasGraph,
        partition: &SccPartition,
        component: usize,
        rng: &mut StdRng,
    ) -> Result<Option<EdgePair>, FasError> {
        let line = LineGraph::build(graph, partition, component, rng);
        let ranks = pagerank(&line.graph, &self.config.pagerank)?;

        let Some(top) = ranks.argmax() else {
            return Ok(None);
        };
        let top = NodeIndex::new(top);
        let removed = graph.remove_edge_index(line.source_edge(top));

        debug!(
            component,
            members = partition.components[component].len(),
            line_vertices = line.node_count(),
            line_edges = line.edge_count(),
            iterations = ranks.iterations,
            converged = ranks.converged,
            score = ranks.scores[top.index()],
            edge = ?removed,
            "cut top-ranked edge"
        );
        Ok(removed)
    }
}

impl FasStrategy for PageRankFas {
    #[instrument(skip(self, graph), fields(n = graph.node_count(), m = graph.edge_count()))]
    fn feedback_arc_set(&self, graph: &mut FasGraph) -> Result<FasResult, FasError> {
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let node_count = graph.node_count();

        let mut arcs = graph.remove_self_loops();
        if !arcs.is_empty() {
            debug!(self_loops = arcs.len(), "moved self-loops into feedback arc set");
        }
        arcs.reserve(graph.edge_count() / 4);

        info!("starting PageRank FAS");

        let mut rounds = 0_usize;
        let mut phase = Phase::Checking;

        loop {
            phase = match phase {
                Phase::Checking => {
                    if is_cyclic(graph) {
                        if self.config.progress.should_log(rounds, node_count) {
                            info!(
                                fas_size = arcs.len(),
                                elapsed_secs = start.elapsed().as_secs_f64(),
                                "graph is cyclic, computing FAS"
                            );
                        }
                        Phase::Decomposing
                    } else {
                        Phase::Done
                    }
                }
                Phase::Decomposing => Phase::Cutting(strongly_connected_components(graph)),
                Phase::Cutting(partition) => {
                    for (component, _) in partition.non_trivial() {
                        if let Some(pair) =
                            self.cut_component(graph, &partition, component, &mut rng)?
                        {
                            arcs.push(pair);
                        }
                    }
                    rounds += 1;
                    Phase::Checking
                }
                Phase::Done => break,
            };
        }

        arcs.shrink_to_fit();
        info!(
            fas_size = arcs.len(),
            rounds,
            elapsed_secs = start.elapsed().as_secs_f64(),
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            "feedback arc set computed"
        );

        Ok(FasResult {
            arcs,
            rounds,
            strategy: StrategyKind::PageRank,
        })
    }
}
