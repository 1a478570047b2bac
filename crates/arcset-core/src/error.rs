//! Error taxonomy for arcset.
//!
//! The heuristic itself cannot fail on a well-formed graph. Errors come from
//! the edges of the system: reading edge lists, loading configuration, and
//! a PageRank worker thread panicking mid-iteration.

use std::io;
use std::path::PathBuf;

/// Errors produced by arcset operations.
#[derive(Debug, thiserror::Error)]
pub enum FasError {
    /// An edge-list line could not be parsed.
    #[error("edge list line {line}: {message}")]
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A PageRank worker panicked; its score range was never written.
    #[error("PageRank worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker whose thread panicked.
        worker: usize,
    },
}

impl From<toml::de::Error> for FasError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
