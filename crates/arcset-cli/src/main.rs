#![forbid(unsafe_code)]

use anyhow::{Context, bail};
use arcset_core::graph::cycles::is_cyclic;
use arcset_core::{EdgePair, FasConfig, FasContext, FasGraph, StrategyKind};
use clap::Parser;
use serde::Serialize;
use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "arcset",
    author,
    version,
    about = "arcset: approximate minimum feedback arc set",
    long_about = None
)]
struct Cli {
    /// Edge list to read (`source target` per line); `-` reads stdin.
    input: PathBuf,

    /// Heuristic to run: `pagerank` or `sort`.
    #[arg(short, long, default_value_t = StrategyKind::PageRank)]
    strategy: StrategyKind,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed used for line-graph traversal.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit JSON output instead of one arc per line.
    #[arg(long)]
    json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Fail if the graph still has a cycle after removing the arcs.
    #[arg(long)]
    verify: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<FasConfig> {
        let mut config = match &self.config {
            Some(path) => FasConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => FasConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }

    fn read_graph(&self) -> anyhow::Result<FasGraph> {
        if self.input.as_os_str() == "-" {
            return FasGraph::from_reader(io::stdin().lock())
                .context("reading edge list from stdin");
        }
        FasGraph::from_path(&self.input)
            .with_context(|| format!("reading edge list {}", self.input.display()))
    }
}

/// JSON shape printed with `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    strategy: StrategyKind,
    rounds: usize,
    arcs: &'a [EdgePair],
    vertices: usize,
    edges: usize,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ARCSET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "arcset=debug,info"
        } else {
            "arcset=info,warn"
        })
    });

    let format = env::var("ARCSET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.load_config()?;
    let mut graph = cli.read_graph()?;
    let vertices = graph.node_count();
    let edges = graph.edge_count();
    info!(vertices, edges, strategy = %cli.strategy, "loaded graph");

    let result = FasContext::new(cli.strategy, config)
        .feedback_arc_set(&mut graph)
        .context("computing feedback arc set")?;

    if cli.verify {
        if is_cyclic(&graph) {
            bail!(
                "graph is still cyclic after removing {} arcs",
                result.arcs.len()
            );
        }
        debug!("verified residual graph is acyclic");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if cli.json {
        let report = Report {
            strategy: result.strategy,
            rounds: result.rounds,
            arcs: &result.arcs,
            vertices,
            edges,
        };
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        for (source, target) in &result.arcs {
            writeln!(out, "{source} {target}")?;
        }
    }
    out.flush()?;
    Ok(())
}
