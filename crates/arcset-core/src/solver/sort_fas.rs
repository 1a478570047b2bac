//! SortFAS: insertion-sort ordering heuristic.
//!
//! Vertices are taken in index order and each one is inserted into the
//! already-placed prefix at the position that minimises the number of arcs
//! pointing backwards (leftmost position on ties). Moving `v` in front of a
//! placed vertex `w` turns every `w → v` arc into a back arc and every
//! `v → w` arc into a forward one, so a single right-to-left scan with a
//! running balance finds the best slot.
//!
//! All arcs pointing backwards in the final order form the feedback arc set.
//! Cost is O(V² + E): no SCC decomposition, no iteration.

use std::collections::HashMap;
use std::time::Instant;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::{info, instrument};

use crate::error::FasError;
use crate::graph::build::{EdgePair, FasGraph};
use crate::solver::{FasResult, FasStrategy, StrategyKind};

/// The SortFAS heuristic. Stateless and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortFas;

impl FasStrategy for SortFas {
    #[instrument(skip(self, graph), fields(n = graph.node_count(), m = graph.edge_count()))]
    fn feedback_arc_set(&self, graph: &mut FasGraph) -> Result<FasResult, FasError> {
        let start = Instant::now();
        let order = insertion_order(graph);

        let mut position = vec![0_usize; graph.node_count()];
        for (pos, v) in order.iter().enumerate() {
            position[v.index()] = pos;
        }

        let g = &graph.graph;
        let arcs: Vec<EdgePair> = g
            .edge_references()
            .filter(|e| position[e.source().index()] >= position[e.target().index()])
            .map(|e| (g[e.source()], g[e.target()]))
            .collect();

        graph.retain_edges(|a, b| position[a.index()] < position[b.index()]);

        info!(
            fas_size = arcs.len(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "feedback arc set computed"
        );

        Ok(FasResult {
            arcs,
            rounds: 0,
            strategy: StrategyKind::Sort,
        })
    }
}

/// Compute the SortFAS vertex order.
#[must_use]
pub fn insertion_order(graph: &FasGraph) -> Vec<NodeIndex> {
    let g = &graph.graph;
    let mut order: Vec<NodeIndex> = Vec::with_capacity(g.node_count());
    let mut balance: HashMap<NodeIndex, i64> = HashMap::new();

    for v in g.node_indices() {
        // balance[w] = (#w→v) − (#v→w): change in back arcs when v jumps w.
        balance.clear();
        for w in g.neighbors_directed(v, Direction::Incoming) {
            if w != v {
                *balance.entry(w).or_default() += 1;
            }
        }
        for w in g.neighbors_directed(v, Direction::Outgoing) {
            if w != v {
                *balance.entry(w).or_default() -= 1;
            }
        }

        let mut running = 0_i64;
        let mut best = 0_i64;
        let mut slot = order.len();
        for j in (0..order.len()).rev() {
            running += balance.get(&order[j]).copied().unwrap_or(0);
            if running <= best {
                best = running;
                slot = j;
            }
        }
        order.insert(slot, v);
    }

    order
}
