mod aggregate;
mod bench;
mod engine;
mod error;
mod input;
mod opt;
mod partition;
mod report;
mod template;
mod worker;

use std::fs::File;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use bench::Benchmark;
use engine::PostgresEngine;
use error::BenchError;
use opt::Opt;
use template::{QueryTemplate, DEFAULT_TEMPLATE};

fn main() -> ExitCode {
    let opt = Opt::parse();
    init_logging(opt.verbose);

    match run(&opt) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Returns whether every worker succeeded.
fn run(opt: &Opt) -> Result<bool, BenchError> {
    let benchmark = Benchmark {
        workers: opt.workers as usize,
        balance: opt.balance,
        policy: opt.on_error,
        template: QueryTemplate::new(opt.template.as_deref().unwrap_or(DEFAULT_TEMPLATE))?,
    };
    let engine = PostgresEngine::new(opt.connection.clone());

    let report = match &opt.filename {
        Some(path) => {
            let file = File::open(path)
                .map_err(|source| BenchError::OpenInput { path: path.clone(), source })?;
            benchmark.run(&engine, file)?
        }
        None => benchmark.run(&engine, io::stdin().lock())?,
    };
    let Some(report) = report else {
        return Ok(true);
    };

    if let Some(stats) = &report.stats {
        print!("{}", stats);
    }
    for failure in &report.failures {
        error!("worker {}: {}", failure.slot, failure.error);
    }
    if !report.failures.is_empty() {
        error!(
            "{} of {} workers failed; statistics cover the remaining workers",
            report.failures.len(),
            report.workers
        );
    }
    Ok(report.failures.is_empty())
}
