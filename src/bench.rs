use std::io::Read;

use tracing::info;

use crate::aggregate::{aggregate, GlobalStats};
use crate::engine::QueryEngine;
use crate::error::BenchError;
use crate::input::read_descriptors;
use crate::partition::{partition_descriptors, Balance};
use crate::template::QueryTemplate;
use crate::worker::{FailurePolicy, WorkerFailure, WorkerPool};

pub struct Benchmark {
    pub workers: usize,
    pub balance: Balance,
    pub policy: FailurePolicy,
    pub template: QueryTemplate,
}

#[derive(Debug)]
pub struct BenchReport {
    /// Number of workers that were actually started.
    pub workers: usize,
    pub stats: Option<GlobalStats>,
    pub failures: Vec<WorkerFailure>,
}

impl Benchmark {
    /// Loads and partitions `input`, runs the workers against `engine` and
    /// aggregates their timings. Returns `None` when the input has no data rows.
    pub fn run<E: QueryEngine>(
        &self,
        engine: &E,
        input: impl Read,
    ) -> Result<Option<BenchReport>, BenchError> {
        let descriptors = read_descriptors(input);
        let partitions = partition_descriptors(descriptors, self.workers, self.balance)?;
        if partitions.is_empty() {
            info!("no input CSV content, exiting");
            return Ok(None);
        }

        let outcome = WorkerPool::new(engine, &self.template, self.policy).run(&partitions)?;
        Ok(Some(BenchReport {
            workers: outcome.workers,
            stats: aggregate(&outcome.results),
            failures: outcome.failures,
        }))
    }
}
