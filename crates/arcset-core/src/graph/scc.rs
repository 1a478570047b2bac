//! Strongly connected components via Tarjan's algorithm.
//!
//! # Algorithm
//!
//! Single-pass Tarjan: each vertex gets a discovery index and a low-link
//! value; vertices wait on a membership stack until the root of their
//! component finishes, at which point the whole component is popped.
//!
//! The DFS is driven by an explicit frame stack of `(vertex, neighbor
//! iterator)` pairs instead of recursion, so a path of a million vertices
//! costs a million frames of heap rather than a stack overflow.
//!
//! # Determinism
//!
//! Roots are taken in vertex-index order and neighbors in petgraph's
//! adjacency order, so the partition and the order components are emitted
//! in depend only on the graph.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use petgraph::graph::{Neighbors, NodeIndex};

use crate::graph::build::FasGraph;

const UNVISITED: usize = usize::MAX;

/// Partition of a graph's vertices into strongly connected components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SccPartition {
    /// Components in Tarjan emission order (sinks of the condensation first).
    pub components: Vec<Vec<NodeIndex>>,
    /// `component_of[v.index()]` is the position of `v`'s component in
    /// [`SccPartition::components`].
    pub component_of: Vec<usize>,
}

impl SccPartition {
    /// Return `true` if `a` and `b` are in the same component.
    #[must_use]
    pub fn same_component(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.component_of[a.index()] == self.component_of[b.index()]
    }

    /// Return `true` if `v` belongs to component `component`.
    #[must_use]
    pub fn contains(&self, component: usize, v: NodeIndex) -> bool {
        self.component_of[v.index()] == component
    }

    /// Iterate over components with more than one vertex, with their ids.
    pub fn non_trivial(&self) -> impl Iterator<Item = (usize, &[NodeIndex])> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, members)| members.len() > 1)
            .map(|(id, members)| (id, members.as_slice()))
    }

    /// Number of components with more than one vertex.
    #[must_use]
    pub fn non_trivial_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() > 1).count()
    }
}

struct Frame<'a> {
    vertex: NodeIndex,
    neighbors: Neighbors<'a, ()>,
}

/// Decompose `graph` into strongly connected components.
///
/// Isolated vertices (and vertices on no cycle) come back as singleton
/// components; callers filter those out with [`SccPartition::non_trivial`].
#[must_use]
pub fn strongly_connected_components(graph: &FasGraph) -> SccPartition {
    let g = &graph.graph;
    let n = g.node_count();

    let mut discovery = vec![UNVISITED; n];
    let mut low = vec![UNVISITED; n];
    let mut component_of = vec![UNVISITED; n];
    let mut on_stack = FixedBitSet::with_capacity(n);
    let mut members: Vec<NodeIndex> = Vec::new();
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    let mut frames: Vec<Frame<'_>> = Vec::new();
    let mut next_index = 0_usize;

    for root in g.node_indices() {
        if discovery[root.index()] != UNVISITED {
            continue;
        }

        discovery[root.index()] = next_index;
        low[root.index()] = next_index;
        next_index += 1;
        on_stack.insert(root.index());
        members.push(root);
        frames.push(Frame {
            vertex: root,
            neighbors: g.neighbors_directed(root, Direction::Outgoing),
        });

        while let Some(frame) = frames.last_mut() {
            let v = frame.vertex;

            if let Some(w) = frame.neighbors.next() {
                let wi = w.index();
                if component_of[wi] != UNVISITED {
                    // Already assigned to a finished component: cross edge.
                    continue;
                }
                if discovery[wi] == UNVISITED {
                    discovery[wi] = next_index;
                    low[wi] = next_index;
                    next_index += 1;
                    on_stack.insert(wi);
                    members.push(w);
                    frames.push(Frame {
                        vertex: w,
                        neighbors: g.neighbors_directed(w, Direction::Outgoing),
                    });
                } else if on_stack.contains(wi) {
                    low[v.index()] = low[v.index()].min(discovery[wi]);
                }
                continue;
            }

            // All neighbors of `v` explored.
            frames.pop();
            if let Some(parent) = frames.last() {
                let p = parent.vertex.index();
                low[p] = low[p].min(low[v.index()]);
            }

            if low[v.index()] == discovery[v.index()] {
                let id = components.len();
                let mut component = Vec::new();
                while let Some(w) = members.pop() {
                    on_stack.set(w.index(), false);
                    component_of[w.index()] = id;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    SccPartition {
        components,
        component_of,
    }
}
