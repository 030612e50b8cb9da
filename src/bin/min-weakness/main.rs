//! Command-line driver: load a Matrix Market graph, compute minimum weakness
//! paths from the source vertex and print them to stdout.

mod cli;
mod logging;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use crate::cli::{render_report, run_cli, Cli, CliError};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let report = run_cli(&cli).with_context(|| format!("failed to process `{}`", cli.graph.display()))?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_report(&report, cli.format, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("failed to initialise logging: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let code = err.downcast_ref::<CliError>().and_then(|e| match e {
            CliError::Engine(engine) => Some(engine.code()),
            CliError::Vertex(graph) => Some(graph.code()),
            CliError::Load(_) => None,
        });
        error!(error = %format!("{err:#}"), code, "run failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
