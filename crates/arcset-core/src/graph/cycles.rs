//! Cycle detection.
//!
//! A depth-first traversal from every unvisited vertex, tracking which
//! vertices are on the active DFS path. An edge into a vertex that is still
//! on the path closes a cycle. The traversal keeps its own frame stack so
//! path length is bounded by heap, not by the thread's call stack.

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::{Neighbors, NodeIndex};

use crate::graph::build::FasGraph;

/// Return `true` iff `graph` contains at least one directed cycle.
///
/// Runs in O(V + E) and stops at the first back-edge found. A self-loop is a
/// cycle.
#[must_use]
pub fn is_cyclic(graph: &FasGraph) -> bool {
    let g = &graph.graph;
    let n = g.node_count();

    let mut visited = FixedBitSet::with_capacity(n);
    let mut on_path = FixedBitSet::with_capacity(n);
    // Each frame: (vertex, remaining out-neighbors).
    let mut stack: Vec<(NodeIndex, Neighbors<'_, ()>)> = Vec::new();

    for root in g.node_indices() {
        if visited.contains(root.index()) {
            continue;
        }
        visited.insert(root.index());
        on_path.insert(root.index());
        stack.push((root, g.neighbors_directed(root, Direction::Outgoing)));

        while let Some((vertex, neighbors)) = stack.last_mut() {
            if let Some(next) = neighbors.next() {
                if on_path.contains(next.index()) {
                    return true;
                }
                if !visited.contains(next.index()) {
                    visited.insert(next.index());
                    on_path.insert(next.index());
                    stack.push((next, g.neighbors_directed(next, Direction::Outgoing)));
                }
            } else {
                on_path.set(vertex.index(), false);
                stack.pop();
            }
        }
    }

    false
}
