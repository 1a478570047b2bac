//! Graph container and edge-list reader.
//!
//! # Overview
//!
//! [`FasGraph`] wraps a petgraph [`DiGraph`] whose node weights are the
//! caller's opaque integer identifiers. Node indices are assigned in
//! first-seen order and never change, because the solver only ever removes
//! edges.
//!
//! ## Edge-list format
//!
//! ```text
//! # comment
//! % also a comment
//! 0 1
//! 1,2
//! 2	0	17      <- extra columns (weights, timestamps) are ignored
//! ```
//!
//! Duplicate edges are collapsed; self-loops are kept (the solver moves them
//! straight into the feedback arc set).

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::instrument;

use crate::error::FasError;

/// External vertex identifier carried as the node payload.
pub type VertexId = u64;

/// An edge expressed as `(source id, target id)`.
pub type EdgePair = (VertexId, VertexId);

// ---------------------------------------------------------------------------
// FasGraph
// ---------------------------------------------------------------------------

/// A directed graph over caller-supplied vertex identifiers.
#[derive(Debug, Clone, Default)]
pub struct FasGraph {
    /// Directed graph: node weight = external vertex id.
    pub graph: DiGraph<VertexId, ()>,
    /// Mapping from external vertex id to petgraph `NodeIndex`.
    pub node_map: HashMap<VertexId, NodeIndex>,
    /// Present edges by endpoint index, for constant-time duplicate checks.
    /// Kept in step with `graph` by every mutating method here.
    edge_set: HashSet<(NodeIndex, NodeIndex)>,
}

impl FasGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(source, target)` pairs, in order.
    #[must_use]
    pub fn from_edges(edges: &[EdgePair]) -> Self {
        let mut graph = Self::new();
        for &(from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    /// Read an edge list from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`FasError::Io`] if reading fails and [`FasError::Parse`] for
    /// a line that does not start with two unsigned integers.
    #[instrument(skip(reader))]
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, FasError> {
        let mut graph = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some((from, to)) = parse_edge_line(&line, line_no + 1)? {
                graph.add_edge(from, to);
            }
        }

        tracing::debug!(
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            "edge list loaded"
        );
        Ok(graph)
    }

    /// Read an edge list from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`FasError::InputNotFound`] when `path` does not exist, and
    /// otherwise the errors of [`FasGraph::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self, FasError> {
        if !path.exists() {
            return Err(FasError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Insert a vertex (no-op if it already exists) and return its index.
    pub fn add_vertex(&mut self, id: VertexId) -> NodeIndex {
        let graph = &mut self.graph;
        *self.node_map.entry(id).or_insert_with(|| graph.add_node(id))
    }

    /// Insert `from → to`, creating missing endpoints.
    ///
    /// Returns `false` when the edge was already present.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> bool {
        let a = self.add_vertex(from);
        let b = self.add_vertex(to);
        if !self.edge_set.insert((a, b)) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// Remove `from → to`. Returns `false` if no such edge exists.
    pub fn remove_edge(&mut self, from: VertexId, to: VertexId) -> bool {
        let (Some(a), Some(b)) = (self.node_index(from), self.node_index(to)) else {
            return false;
        };
        if !self.edge_set.remove(&(a, b)) {
            return false;
        }
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.remove_edge(e))
            .is_some()
    }

    /// Remove an edge by index, returning its endpoint ids.
    ///
    /// Petgraph moves the last edge into the freed slot, so previously
    /// obtained edge indices must not be reused after this call.
    pub fn remove_edge_index(&mut self, edge: EdgeIndex) -> Option<EdgePair> {
        let endpoints = self.graph.edge_endpoints(edge)?;
        let pair = self.edge_pair(edge)?;
        self.graph.remove_edge(edge)?;
        self.edge_set.remove(&endpoints);
        Some(pair)
    }

    /// Remove every self-loop and return them in edge-index order.
    pub fn remove_self_loops(&mut self) -> Vec<EdgePair> {
        let loops: Vec<EdgePair> = self
            .graph
            .edge_references()
            .filter(|e| e.source() == e.target())
            .map(|e| {
                let id = self.graph[e.source()];
                (id, id)
            })
            .collect();

        if !loops.is_empty() {
            self.retain_edges(|a, b| a != b);
        }
        loops
    }

    /// Keep only the edges for which `keep(source, target)` returns `true`.
    ///
    /// Like [`FasGraph::remove_edge_index`], this invalidates edge indices.
    pub fn retain_edges<F>(&mut self, mut keep: F)
    where
        F: FnMut(NodeIndex, NodeIndex) -> bool,
    {
        let edge_set = &mut self.edge_set;
        self.graph.retain_edges(|g, e| {
            let Some((a, b)) = g.edge_endpoints(e) else {
                return false;
            };
            let kept = keep(a, b);
            if !kept {
                edge_set.remove(&(a, b));
            }
            kept
        });
    }

    /// Return `true` if `from → to` is present.
    #[must_use]
    pub fn contains_edge(&self, from: VertexId, to: VertexId) -> bool {
        match (self.node_index(from), self.node_index(to)) {
            (Some(a), Some(b)) => self.edge_set.contains(&(a, b)),
            _ => false,
        }
    }

    /// Look up the `NodeIndex` for a vertex id.
    #[must_use]
    pub fn node_index(&self, id: VertexId) -> Option<NodeIndex> {
        self.node_map.get(&id).copied()
    }

    /// Return the external id of a node.
    #[must_use]
    pub fn vertex_id(&self, idx: NodeIndex) -> VertexId {
        self.graph[idx]
    }

    /// Return the endpoint ids of an edge.
    #[must_use]
    pub fn edge_pair(&self, edge: EdgeIndex) -> Option<EdgePair> {
        self.graph
            .edge_endpoints(edge)
            .map(|(a, b)| (self.graph[a], self.graph[b]))
    }

    /// All edges as id pairs, in edge-index order.
    #[must_use]
    pub fn edge_pairs(&self) -> Vec<EdgePair> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
            .collect()
    }

    /// Return the number of vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_edge_line(line: &str, line_no: usize) -> Result<Option<EdgePair>, FasError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
        return Ok(None);
    }

    let mut fields = trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty());

    let from = parse_vertex(fields.next(), line_no, "source")?;
    let to = parse_vertex(fields.next(), line_no, "target")?;
    Ok(Some((from, to)))
}

fn parse_vertex(field: Option<&str>, line: usize, role: &str) -> Result<VertexId, FasError> {
    let Some(field) = field else {
        return Err(FasError::Parse {
            line,
            message: format!("missing {role} vertex"),
        });
    };
    field.parse::<VertexId>().map_err(|err| FasError::Parse {
        line,
        message: format!("invalid {role} vertex {field:?}: {err}"),
    })
}
