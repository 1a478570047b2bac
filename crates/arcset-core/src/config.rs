use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FasError;
use crate::metrics::pagerank::PageRankConfig;

/// Solver configuration, loadable from TOML.
///
/// Every field has a default, so an empty file (or no file) reproduces the
/// stock heuristic: seed 42, five PageRank iterations, `1e-6` tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FasConfig {
    /// Seed for the start-vertex picker used by line-graph construction.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub pagerank: PageRankConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl Default for FasConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            pagerank: PageRankConfig::default(),
            progress: ProgressConfig::default(),
        }
    }
}

/// Throttling for progress log lines in the outer loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Graphs with more vertices than this only log every `log_every` rounds.
    #[serde(default = "default_large_graph_threshold")]
    pub large_graph_threshold: usize,
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            large_graph_threshold: default_large_graph_threshold(),
            log_every: default_log_every(),
        }
    }
}

impl ProgressConfig {
    /// Whether round `round` of a graph with `node_count` vertices should log.
    #[must_use]
    pub const fn should_log(&self, round: usize, node_count: usize) -> bool {
        if node_count <= self.large_graph_threshold || self.log_every <= 1 {
            return true;
        }
        round % self.log_every == 0
    }
}

impl FasConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`FasError::Config`] if the text is not valid TOML or a field
    /// has the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self, FasError> {
        Ok(toml::from_str::<Self>(content)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`FasError::InputNotFound`] if `path` does not exist,
    /// [`FasError::Io`] if it cannot be read, and [`FasError::Config`] if it
    /// does not parse.
    pub fn load(path: &Path) -> Result<Self, FasError> {
        if !path.exists() {
            return Err(FasError::InputNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_large_graph_threshold() -> usize {
    10_000
}

const fn default_log_every() -> usize {
    10
}
