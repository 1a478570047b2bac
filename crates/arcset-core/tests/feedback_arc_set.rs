//! End-to-end properties of the feedback arc set solvers.
//!
//! # Test Strategy
//!
//! 1. Generate seeded random directed graphs of varying size and density.
//! 2. Run the solver on a copy.
//! 3. Check the result against the *original* edge list:
//!    - every selected arc is an original edge, selected once;
//!    - removing the selected arcs leaves an acyclic graph;
//!    - the solver's own graph equals original minus selected.
//!
//! Structured cases (simple cycles, disjoint cycles, DAGs) pin the exact
//! counts the heuristic guarantees.

use std::collections::{BTreeSet, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcset_core::graph::cycles::is_cyclic;
use arcset_core::graph::line::LineGraph;
use arcset_core::graph::scc::strongly_connected_components;
use arcset_core::metrics::pagerank::{PageRankConfig, pagerank};
use arcset_core::solver::{FasStrategy, PageRankFas, SortFas};
use arcset_core::{EdgePair, FasConfig, FasContext, FasGraph, StrategyKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parameters for a random directed graph.
struct RandomGraphParams {
    /// Number of vertices.
    nodes: u64,
    /// Number of distinct edges to attempt (self-loops are skipped).
    edges: usize,
}

fn random_edges(seed: u64, params: &RandomGraphParams) -> Vec<EdgePair> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen: HashSet<EdgePair> = HashSet::new();
    let mut edges = Vec::new();

    for _ in 0..params.edges * 3 {
        if edges.len() >= params.edges {
            break;
        }
        let a = rng.gen_range(0..params.nodes);
        let b = rng.gen_range(0..params.nodes);
        if a != b && seen.insert((a, b)) {
            edges.push((a, b));
        }
    }
    edges
}

fn simple_cycle(n: u64, offset: u64) -> Vec<EdgePair> {
    (0..n).map(|i| (offset + i, offset + (i + 1) % n)).collect()
}

fn run(kind: StrategyKind, edges: &[EdgePair]) -> (FasGraph, Vec<EdgePair>) {
    let mut graph = FasGraph::from_edges(edges);
    let result = FasContext::new(kind, FasConfig::default())
        .feedback_arc_set(&mut graph)
        .expect("solver runs");
    (graph, result.arcs)
}

fn assert_valid_fas(edges: &[EdgePair], residual: &FasGraph, fas: &[EdgePair], label: &str) {
    let original: HashSet<EdgePair> = edges.iter().copied().collect();
    let selected: HashSet<EdgePair> = fas.iter().copied().collect();

    assert_eq!(selected.len(), fas.len(), "{label}: arc selected twice");
    assert!(selected.is_subset(&original), "{label}: arc not in input");

    let remaining: Vec<EdgePair> = edges
        .iter()
        .copied()
        .filter(|e| !selected.contains(e))
        .collect();
    assert!(
        !is_cyclic(&FasGraph::from_edges(&remaining)),
        "{label}: original minus FAS is cyclic"
    );

    let residual_set: BTreeSet<EdgePair> = residual.edge_pairs().into_iter().collect();
    let remaining_set: BTreeSet<EdgePair> = remaining.into_iter().collect();
    assert_eq!(residual_set, remaining_set, "{label}: solver graph drifted");
}

// ---------------------------------------------------------------------------
// Random graphs
// ---------------------------------------------------------------------------

#[test]
fn random_graphs_become_acyclic() {
    for seed in 0..60_u64 {
        let nodes = 5 + seed % 40;
        let density = 1 + usize::try_from(seed % 4).expect("small");
        let params = RandomGraphParams {
            nodes,
            edges: usize::try_from(nodes).expect("small") * density,
        };
        let edges = random_edges(seed, &params);

        for kind in [StrategyKind::PageRank, StrategyKind::Sort] {
            let (residual, fas) = run(kind, &edges);
            assert_valid_fas(&edges, &residual, &fas, &format!("seed {seed} {kind}"));
        }
    }
}

#[test]
fn dense_random_graph_becomes_acyclic() {
    let params = RandomGraphParams {
        nodes: 30,
        edges: 500,
    };
    let edges = random_edges(0xFA5, &params);
    let (residual, fas) = run(StrategyKind::PageRank, &edges);
    assert_valid_fas(&edges, &residual, &fas, "dense");
    assert!(!fas.is_empty());
}

#[test]
fn acyclic_input_yields_empty_set_and_untouched_graph() {
    for seed in 0..20_u64 {
        // Forward edges only (a < b) form a DAG.
        let edges: Vec<EdgePair> = random_edges(seed, &RandomGraphParams { nodes: 25, edges: 80 })
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let graph = FasGraph::from_edges(&edges);
        let before = graph.edge_pairs();

        let mut working = graph.clone();
        let result = PageRankFas::new(FasConfig::default())
            .feedback_arc_set(&mut working)
            .expect("solver runs");

        assert!(result.is_empty(), "seed {seed}");
        assert_eq!(result.rounds, 0);
        assert_eq!(working.edge_pairs(), before);
    }
}

// ---------------------------------------------------------------------------
// Structured graphs
// ---------------------------------------------------------------------------

#[test]
fn simple_cycle_loses_exactly_one_edge_and_becomes_a_path() {
    for n in [2_u64, 3, 5, 17, 100] {
        let edges = simple_cycle(n, 0);
        let (residual, fas) = run(StrategyKind::PageRank, &edges);

        assert_eq!(fas.len(), 1, "cycle of length {n}");
        assert_eq!(residual.edge_count(), usize::try_from(n - 1).expect("small"));
        assert!(!is_cyclic(&residual));

        // A simple path: every vertex has in/out degree ≤ 1, exactly one
        // source and one sink.
        let pairs = residual.edge_pairs();
        let sources: HashSet<u64> = pairs.iter().map(|e| e.0).collect();
        let targets: HashSet<u64> = pairs.iter().map(|e| e.1).collect();
        assert_eq!(sources.len(), pairs.len());
        assert_eq!(targets.len(), pairs.len());
        let (cut_from, cut_to) = fas[0];
        assert!(!targets.contains(&cut_to), "path starts where the cut edge ended");
        assert!(!sources.contains(&cut_from), "path ends where the cut edge began");
    }
}

#[test]
fn disjoint_cycles_lose_one_edge_each() {
    let mut edges = simple_cycle(4, 0);
    edges.extend(simple_cycle(7, 100));

    let (residual, fas) = run(StrategyKind::PageRank, &edges);

    assert_eq!(fas.len(), 2);
    let in_first = fas.iter().filter(|(a, _)| *a < 100).count();
    assert_eq!(in_first, 1, "one cut per cycle: {fas:?}");
    assert!(!is_cyclic(&residual));
}

#[test]
fn cycles_joined_by_a_bridge_are_cut_independently() {
    let mut edges = simple_cycle(3, 0);
    edges.extend(simple_cycle(3, 10));
    edges.push((0, 10));

    let (residual, fas) = run(StrategyKind::PageRank, &edges);
    assert_eq!(fas.len(), 2);
    assert!(!fas.contains(&(0, 10)), "bridge is not on any cycle");
    assert!(residual.contains_edge(0, 10));
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn same_seed_same_feedback_arc_set() {
    let edges = random_edges(99, &RandomGraphParams { nodes: 40, edges: 160 });
    let (_, first) = run(StrategyKind::PageRank, &edges);
    for _ in 0..3 {
        let (_, again) = run(StrategyKind::PageRank, &edges);
        assert_eq!(again, first);
    }
}

#[test]
fn worker_count_does_not_change_the_result() {
    let edges = random_edges(7, &RandomGraphParams { nodes: 35, edges: 140 });

    let solve_with = |workers: usize| {
        let mut config = FasConfig::default();
        config.pagerank.workers = workers;
        let mut graph = FasGraph::from_edges(&edges);
        PageRankFas::new(config)
            .feedback_arc_set(&mut graph)
            .expect("solver runs")
            .arcs
    };

    let serial = solve_with(1);
    for workers in [2, 4, 16] {
        assert_eq!(solve_with(workers), serial, "workers={workers}");
    }
}

#[test]
fn sort_strategy_is_deterministic() {
    let edges = random_edges(3, &RandomGraphParams { nodes: 30, edges: 120 });
    let mut a = FasGraph::from_edges(&edges);
    let mut b = FasGraph::from_edges(&edges);
    let ra = SortFas.feedback_arc_set(&mut a).expect("runs");
    let rb = SortFas.feedback_arc_set(&mut b).expect("runs");
    assert_eq!(ra, rb);
}

// ---------------------------------------------------------------------------
// Centrality scorer on line graphs
// ---------------------------------------------------------------------------

#[test]
fn regular_line_graph_converges_before_cap() {
    // Line graph of a directed cycle is itself a cycle: 1-regular and
    // strongly connected.
    let graph = FasGraph::from_edges(&simple_cycle(9, 0));
    let partition = strongly_connected_components(&graph);
    let line = LineGraph::build(&graph, &partition, 0, &mut StdRng::seed_from_u64(42));

    let config = PageRankConfig::default();
    let result = pagerank(&line.graph, &config).expect("runs");
    assert!(result.converged);
    assert!(result.iterations < config.max_iter);
    for score in &result.scores {
        assert!((score - 1.0 / 9.0).abs() < 1e-9);
    }
}

#[test]
fn regular_strongly_connected_graph_stays_uniform() {
    // Circulant digraph i → i+1, i → i+3 (mod 10): every vertex has in- and
    // out-degree 2, so the uniform start is already stationary.
    let n = 10_usize;
    let mut g = DiGraph::<(), ()>::new();
    let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
    for i in 0..n {
        g.add_edge(nodes[i], nodes[(i + 1) % n], ());
        g.add_edge(nodes[i], nodes[(i + 3) % n], ());
    }

    let config = PageRankConfig::default();
    let result = pagerank(&g, &config).expect("runs");
    assert!(result.converged);
    assert!(result.iterations < config.max_iter);
    for score in &result.scores {
        assert!((score - 0.1).abs() < 1e-9);
    }
}
