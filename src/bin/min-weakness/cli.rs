//! Argument parsing, the search run, and report rendering.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::info;

use min_weakness::{
    load_graph, EngineError, GraphError, LoadError, RunReport, ShortestPathEngine, VertexId, VertexReport,
};

/// Minimum weakness paths from one vertex of an undirected Matrix Market graph.
#[derive(Debug, Parser)]
#[command(name = "min-weakness", version, about)]
pub struct Cli {
    /// Matrix Market coordinate file describing the graph.
    pub graph: PathBuf,
    /// 1-based source vertex.
    #[arg(long, short, default_value_t = 1)]
    pub source: u32,
    /// Only report these vertices (repeatable); all vertices by default.
    #[arg(long = "target", short = 't')]
    pub targets: Vec<u32>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("invalid vertex argument: {0}")]
    Vertex(#[from] GraphError),
    #[error("search aborted: {0}")]
    Engine(#[from] EngineError),
}

/// Loads the graph, runs the search and collects the requested reports.
pub fn run_cli(cli: &Cli) -> Result<RunReport, CliError> {
    let mut graph = load_graph(&cli.graph)?;
    let source = graph.vertex(cli.source)?;
    let targets = cli
        .targets
        .iter()
        .map(|&t| graph.vertex(t))
        .collect::<Result<Vec<_>, _>>()?;
    let paths = ShortestPathEngine::new(&mut graph).run(source)?;
    let report = paths.run_report(&targets);
    info!(
        source = %source,
        reached = report.info.reached,
        relaxations = report.info.relaxations,
        "minimum weakness computed"
    );
    Ok(report)
}

pub fn render_report(report: &RunReport, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "source {}: {} vertices, {} edges, {} reachable",
                report.source, report.vertices, report.edges, report.info.reached
            )?;
            report.results.iter().try_for_each(|r| render_line(r, out))
        }
    }
}

fn render_line(report: &VertexReport, out: &mut impl Write) -> io::Result<()> {
    match (report.weakness, &report.path) {
        (Some(weakness), Some(path)) => {
            writeln!(out, "vertex {}: weakness {} via {}", report.vertex, weakness, join_path(path))
        }
        _ => writeln!(out, "vertex {}: unreachable", report.vertex),
    }
}

fn join_path(path: &[VertexId]) -> String {
    path.iter().map(VertexId::to_string).collect::<Vec<_>>().join(" -> ")
}
