//! Directed graph container and the structural algorithms the solver runs on it.
//!
//! # Overview
//!
//! ```text
//! edge list (file / stdin)
//!        ↓  build::FasGraph::from_reader()
//! FasGraph (DiGraph<VertexId, ()>, possibly cyclic)
//!        ↓  cycles::is_cyclic()            (loop termination test)
//!        ↓  scc::strongly_connected_components()
//! SccPartition (components in Tarjan emission order)
//!        ↓  line::LineGraph::build()       (per non-trivial component)
//! LineGraph (vertices = internal edges of one component)
//! ```
//!
//! Every traversal here uses an explicit stack, so arbitrarily deep graphs
//! never touch the call-stack limit.

pub mod build;
pub mod cycles;
pub mod line;
pub mod scc;

pub use build::{EdgePair, FasGraph, VertexId};
pub use cycles::is_cyclic;
pub use line::LineGraph;
pub use scc::{SccPartition, strongly_connected_components};
