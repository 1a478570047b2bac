//! Line graph of one strongly connected component.
//!
//! # Overview
//!
//! Each vertex of the line graph stands for one edge `(a, b)` of the source
//! graph whose endpoints both lie in the component. A line edge runs from
//! `(a, b)` to `(b, c)`: two arcs that can be walked one after the other.
//! Centrality over this graph ranks *edges* by how many cycle paths pass
//! through them, which is what the solver needs since it cuts edges.
//!
//! # Construction
//!
//! 1. Every internal edge becomes a line vertex; the edge ↔ line-vertex maps
//!    are filled at the same time. Members are taken in component order and
//!    each member's out-edges in insertion order, which fixes the line-vertex
//!    indices and so the first-index tie-break of the scorer.
//! 2. An explicit-stack DFS starts at a (seeded-random) member vertex with no
//!    predecessor edge. Expanding vertex `u`, reached via line vertex `prev`:
//!    - `u`'s internal out-edges are computed once and cached;
//!    - for each out-edge `z = (u, k)`, `prev → z` is added;
//!    - unvisited `k` is pushed as `(k, z)`;
//!    - already-visited `k` gets `z → z2` for each cached out-edge `z2` of `k`.
//! 3. A stack entry whose vertex was expanded through another path after the
//!    entry was pushed is dropped.
//!
//! Step 3 makes the result a traversal-dependent subgraph of the full line
//! graph: the `prev` of a dropped entry gets no successors, so it may end up
//! a sink. Scores, and therefore the edge that gets cut, depend on this.
//!
//! The structure is transient: it is built for one component in one solver
//! round and dropped once that component's edge is cut.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rand::Rng;

use crate::graph::build::{EdgePair, FasGraph};
use crate::graph::scc::SccPartition;

/// Index of a vertex in a [`LineGraph`].
pub type LineIndex = NodeIndex;

/// Payload of a line-graph vertex: the source edge it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineVertex {
    /// Edge index in the source [`FasGraph`] (valid until that graph mutates).
    pub edge: EdgeIndex,
    /// Endpoint ids of the source edge.
    pub pair: EdgePair,
}

/// Line graph over the internal edges of one component.
#[derive(Debug, Clone)]
pub struct LineGraph {
    /// Line vertices carry the source edge they stand for (line → edge map).
    pub graph: DiGraph<LineVertex, ()>,
    /// Source edge → line vertex.
    pub edge_to_vertex: HashMap<EdgeIndex, LineIndex>,
    /// Member vertex the traversal started from.
    pub start: NodeIndex,
}

/// Cached internal out-edges per source vertex: `(line vertex, edge target)`.
type AdjacencyCache = HashMap<NodeIndex, Vec<(LineIndex, NodeIndex)>>;

impl LineGraph {
    /// Build the line graph of `component`, starting the traversal at a
    /// member drawn uniformly from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `component` has no members.
    #[must_use]
    pub fn build<R: Rng + ?Sized>(
        graph: &FasGraph,
        partition: &SccPartition,
        component: usize,
        rng: &mut R,
    ) -> Self {
        let members = &partition.components[component];
        let start = members[rng.gen_range(0..members.len())];
        Self::build_from(graph, partition, component, start)
    }

    /// Build the line graph of `component` with an explicit start vertex.
    #[must_use]
    pub fn build_from(
        graph: &FasGraph,
        partition: &SccPartition,
        component: usize,
        start: NodeIndex,
    ) -> Self {
        let mut line = Self::with_vertices(graph, partition, component);
        line.start = start;
        line.connect(graph, partition, component);
        line
    }

    /// One line vertex per internal edge; no line edges yet.
    fn with_vertices(graph: &FasGraph, partition: &SccPartition, component: usize) -> Self {
        let g = &graph.graph;
        let members = &partition.components[component];
        let mut line = DiGraph::<LineVertex, ()>::new();
        let mut edge_to_vertex = HashMap::new();

        for &v in members {
            for (edge, target) in internal_out_edges(graph, partition, component, v) {
                let z = line.add_node(LineVertex {
                    edge,
                    pair: (g[v], g[target]),
                });
                edge_to_vertex.insert(edge, z);
            }
        }

        Self {
            graph: line,
            edge_to_vertex,
            start: members[0],
        }
    }

    fn connect(&mut self, graph: &FasGraph, partition: &SccPartition, component: usize) {
        let mut cache = AdjacencyCache::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<(NodeIndex, Option<LineIndex>)> = vec![(self.start, None)];

        while let Some((u, prev)) = stack.pop() {
            if !visited.insert(u) {
                continue;
            }

            let outgoing = adjacent_line_edges(
                &mut cache,
                graph,
                partition,
                component,
                &self.edge_to_vertex,
                u,
            )
            .to_vec();

            for (z, k) in outgoing {
                if let Some(prev) = prev.filter(|&p| p != z) {
                    self.graph.add_edge(prev, z, ());
                }

                if visited.contains(&k) {
                    let next = adjacent_line_edges(
                        &mut cache,
                        graph,
                        partition,
                        component,
                        &self.edge_to_vertex,
                        k,
                    );
                    for &(z2, _) in next {
                        if z2 != z {
                            self.graph.add_edge(z, z2, ());
                        }
                    }
                } else {
                    stack.push((k, Some(z)));
                }
            }
        }
    }

    /// Source edge represented by line vertex `v`.
    #[must_use]
    pub fn source_edge(&self, v: LineIndex) -> EdgeIndex {
        self.graph[v].edge
    }

    /// Endpoint ids of the source edge represented by `v`.
    #[must_use]
    pub fn source_pair(&self, v: LineIndex) -> EdgePair {
        self.graph[v].pair
    }

    /// Line vertex standing for source edge `edge`, if it is internal.
    #[must_use]
    pub fn vertex_of(&self, edge: EdgeIndex) -> Option<LineIndex> {
        self.edge_to_vertex.get(&edge).copied()
    }

    /// Number of line vertices (internal edges of the component).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of line edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

fn adjacent_line_edges<'c>(
    cache: &'c mut AdjacencyCache,
    graph: &FasGraph,
    partition: &SccPartition,
    component: usize,
    edge_to_vertex: &HashMap<EdgeIndex, LineIndex>,
    u: NodeIndex,
) -> &'c [(LineIndex, NodeIndex)] {
    cache.entry(u).or_insert_with(|| {
        internal_out_edges(graph, partition, component, u)
            .into_iter()
            .filter_map(|(edge, target)| edge_to_vertex.get(&edge).map(|&z| (z, target)))
            .collect()
    })
}

/// Out-edges of `u` that stay inside `component`, oldest first.
fn internal_out_edges(
    graph: &FasGraph,
    partition: &SccPartition,
    component: usize,
    u: NodeIndex,
) -> Vec<(EdgeIndex, NodeIndex)> {
    let mut edges: Vec<(EdgeIndex, NodeIndex)> = graph
        .graph
        .edges_directed(u, Direction::Outgoing)
        .filter(|e| partition.contains(component, e.target()))
        .map(|e| (e.id(), e.target()))
        .collect();
    // petgraph walks an adjacency list newest edge first.
    edges.reverse();
    edges
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::graph::scc::strongly_connected_components;

    /// Line edges as `((a, b), (b, c))` id pairs, deduplicated and sorted.
    fn line_edges(line: &LineGraph) -> BTreeSet<(EdgePair, EdgePair)> {
        line.graph
            .edge_references()
            .map(|e| (line.source_pair(e.source()), line.source_pair(e.target())))
            .collect()
    }

    /// Brute-force line graph: every consecutive pair of internal edges.
    fn expected_line_edges(
        graph: &FasGraph,
        partition: &SccPartition,
        component: usize,
    ) -> BTreeSet<(EdgePair, EdgePair)> {
        let internal: Vec<EdgePair> = graph
            .graph
            .edge_references()
            .filter(|e| {
                partition.contains(component, e.source()) && partition.contains(component, e.target())
            })
            .map(|e| (graph.vertex_id(e.source()), graph.vertex_id(e.target())))
            .collect();

        let mut out = BTreeSet::new();
        for &(a, b) in &internal {
            for &(c, d) in &internal {
                if b == c && (a, b) != (c, d) {
                    out.insert(((a, b), (c, d)));
                }
            }
        }
        out
    }

    fn largest_component(partition: &SccPartition) -> usize {
        partition
            .components
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.len())
            .map(|(id, _)| id)
            .unwrap_or_default()
    }

    #[test]
    fn simple_cycle_line_graph_is_a_cycle() {
        let g = FasGraph::from_edges(&[(0, 1), (1, 2), (2, 0)]);
        let p = strongly_connected_components(&g);
        let line = LineGraph::build_from(&g, &p, 0, g.node_index(0).expect("vertex 0"));

        assert_eq!(line.node_count(), 3);
        assert_eq!(line.edge_count(), 3);
        let expected: BTreeSet<(EdgePair, EdgePair)> = [
            ((0, 1), (1, 2)),
            ((1, 2), (2, 0)),
            ((2, 0), (0, 1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(line_edges(&line), expected);
    }

    #[test]
    fn excludes_edges_leaving_the_component() {
        // 2→3 leaves the {0,1,2} component and must not become a line vertex.
        let g = FasGraph::from_edges(&[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 3)]);
        let p = strongly_connected_components(&g);
        let comp = p.component_of[g.node_index(0).expect("vertex 0").index()];
        let line = LineGraph::build_from(&g, &p, comp, g.node_index(1).expect("vertex 1"));

        let pairs: BTreeSet<EdgePair> = line
            .graph
            .node_indices()
            .map(|v| line.source_pair(v))
            .collect();
        assert_eq!(pairs, [(0, 1), (1, 2), (2, 0)].into_iter().collect());
    }

    #[test]
    fn maps_are_inverse_of_each_other() {
        let g = FasGraph::from_edges(&[(0, 1), (1, 0), (1, 2), (2, 1), (2, 0)]);
        let p = strongly_connected_components(&g);
        let line = LineGraph::build_from(&g, &p, 0, g.node_index(2).expect("vertex 2"));

        assert_eq!(line.edge_to_vertex.len(), line.node_count());
        for v in line.graph.node_indices() {
            let edge = line.source_edge(v);
            assert_eq!(line.vertex_of(edge), Some(v));
            assert_eq!(g.edge_pair(edge), Some(line.source_pair(v)));
        }
    }

    #[test]
    fn figure_eight_links_every_consecutive_pair() {
        // Two cycles sharing vertex 0: 0→1→0 and 0→2→3→0. No stack entry
        // goes stale here, so the full line graph comes out from any start.
        let g = FasGraph::from_edges(&[(0, 1), (1, 0), (0, 2), (2, 3), (3, 0)]);
        let p = strongly_connected_components(&g);
        for start in 0..4 {
            let s = g.node_index(start).expect("member");
            let line = LineGraph::build_from(&g, &p, 0, s);
            assert_eq!(line_edges(&line), expected_line_edges(&g, &p, 0), "start {start}");
        }
    }

    #[test]
    fn stale_stack_entry_is_dropped() {
        // From 3: 3→1 and 3→2 are pushed, 2 is expanded first and reaches 1
        // via 0→1, so the pending (1, via 3→1) entry is dropped and 3→1
        // gets no successors.
        let g = FasGraph::from_edges(&[(0, 1), (1, 2), (2, 0), (1, 3), (3, 1), (3, 2)]);
        let p = strongly_connected_components(&g);
        let line = LineGraph::build_from(&g, &p, largest_component(&p), g.node_index(3).expect("3"));

        let expected: BTreeSet<(EdgePair, EdgePair)> = [
            ((0, 1), (1, 2)),
            ((0, 1), (1, 3)),
            ((1, 2), (2, 0)),
            ((1, 3), (3, 1)),
            ((1, 3), (3, 2)),
            ((2, 0), (0, 1)),
            ((3, 2), (2, 0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(line_edges(&line), expected);

        let sinks: Vec<EdgePair> = line
            .graph
            .node_indices()
            .filter(|&v| line.graph.neighbors_directed(v, Direction::Outgoing).next().is_none())
            .map(|v| line.source_pair(v))
            .collect();
        assert_eq!(sinks, vec![(3, 1)]);
    }

    #[test]
    fn dense_component_yields_subgraph_without_parallel_edges() {
        let mut edges = Vec::new();
        for a in 0..6_u64 {
            for b in 0..6_u64 {
                if a != b && (a + 2 * b) % 3 != 0 {
                    edges.push((a, b));
                }
            }
        }
        let g = FasGraph::from_edges(&edges);
        let p = strongly_connected_components(&g);
        let comp = largest_component(&p);
        let full = expected_line_edges(&g, &p, comp);
        let internal = g
            .graph
            .edge_references()
            .filter(|e| p.contains(comp, e.source()) && p.contains(comp, e.target()))
            .count();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..5 {
            let line = LineGraph::build(&g, &p, comp, &mut rng);
            let got = line_edges(&line);
            assert!(got.is_subset(&full));
            assert_eq!(line.edge_count(), got.len(), "parallel line edges");
            assert_eq!(line.node_count(), internal);
        }
    }

    #[test]
    fn line_vertices_follow_edge_insertion_order() {
        let g = FasGraph::from_edges(&[(0, 1), (1, 2), (2, 0), (1, 3), (3, 1), (3, 2)]);
        let p = strongly_connected_components(&g);
        let line = LineGraph::build_from(&g, &p, largest_component(&p), g.node_index(0).expect("0"));

        let position = |pair: EdgePair| {
            line.graph
                .node_indices()
                .position(|v| line.source_pair(v) == pair)
                .expect("internal edge")
        };
        assert_eq!(position((1, 2)) + 1, position((1, 3)));
        assert_eq!(position((3, 1)) + 1, position((3, 2)));
    }

    #[test]
    fn seeded_start_is_reproducible() {
        let g = FasGraph::from_edges(&[(0, 1), (1, 2), (2, 3), (3, 0), (2, 0)]);
        let p = strongly_connected_components(&g);
        let a = LineGraph::build(&g, &p, 0, &mut StdRng::seed_from_u64(42));
        let b = LineGraph::build(&g, &p, 0, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.start, b.start);
        assert_eq!(line_edges(&a), line_edges(&b));
    }
}
