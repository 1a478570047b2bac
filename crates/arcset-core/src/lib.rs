#![forbid(unsafe_code)]
//! arcset-core library.
//!
//! Computes an approximate minimum feedback arc set: a small set of edges
//! whose removal leaves a directed graph acyclic.
//!
//! # Conventions
//!
//! - **Errors**: Use [`FasError`] for library results; the CLI wraps them in `anyhow`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use arcset_core::{FasConfig, FasContext, FasGraph, StrategyKind};
//!
//! let mut graph = FasGraph::from_edges(&[(0, 1), (1, 2), (2, 0)]);
//! let ctx = FasContext::new(StrategyKind::PageRank, FasConfig::default());
//! let result = ctx.feedback_arc_set(&mut graph)?;
//! assert_eq!(result.arcs.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod solver;

pub use config::FasConfig;
pub use error::FasError;
pub use graph::{EdgePair, FasGraph, VertexId};
pub use solver::{FasContext, FasResult, FasStrategy, StrategyKind};
