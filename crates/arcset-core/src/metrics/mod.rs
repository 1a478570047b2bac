//! Centrality metrics used to rank candidate edges.
//!
//! # Overview
//!
//! The solver does not rank vertices of the input graph. It ranks vertices
//! of a [`crate::graph::line::LineGraph`], each of which is an edge of the
//! input. [`pagerank`] scores them in parallel; the highest-scoring line
//! vertex is the edge the solver cuts.
//!
//! ```rust,ignore
//! use arcset_core::metrics::pagerank::{pagerank, PageRankConfig};
//!
//! let result = pagerank(&line.graph, &PageRankConfig::default())?;
//! let cut = result.argmax().map(|i| line.source_edge(NodeIndex::new(i)));
//! ```

pub mod pagerank;
