use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clap::ValueEnum;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::engine::{Connection, QueryEngine};
use crate::error::BenchError;
use crate::partition::Partition;
use crate::template::QueryTemplate;

/// What the pool does when a worker fails.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Stop every worker and report nothing but the failure
    #[default]
    Abort,
    /// Keep the other workers running and report their statistics
    Report,
}

/// Timings collected by one worker. Times are in seconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkerResult {
    pub query_count: usize,
    pub total_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub timings: Vec<f64>,
}

impl WorkerResult {
    pub fn with_capacity(capacity: usize) -> Self {
        WorkerResult { timings: Vec::with_capacity(capacity), ..WorkerResult::default() }
    }

    pub fn record(&mut self, elapsed: f64) {
        if self.query_count == 0 {
            self.min_time = elapsed;
            self.max_time = elapsed;
        } else {
            self.min_time = self.min_time.min(elapsed);
            self.max_time = self.max_time.max(elapsed);
        }
        self.query_count += 1;
        self.total_time += elapsed;
        self.timings.push(elapsed);
    }
}

#[derive(Debug)]
pub struct WorkerFailure {
    pub slot: usize,
    pub error: BenchError,
}

/// Everything the workers handed back once all of them returned.
#[derive(Debug, Default)]
pub struct PoolOutcome {
    pub workers: usize,
    pub results: Vec<WorkerResult>,
    pub failures: Vec<WorkerFailure>,
}

pub struct WorkerPool<'a, E> {
    engine: &'a E,
    template: &'a QueryTemplate,
    policy: FailurePolicy,
}

impl<'a, E: QueryEngine> WorkerPool<'a, E> {
    pub fn new(engine: &'a E, template: &'a QueryTemplate, policy: FailurePolicy) -> Self {
        WorkerPool { engine, template, policy }
    }

    /// Runs one worker per partition and blocks until all of them have returned.
    ///
    /// Under [`FailurePolicy::Abort`] the first failure, by slot, is returned
    /// and no results are kept.
    pub fn run(&self, partitions: &[Partition]) -> Result<PoolOutcome, BenchError> {
        if partitions.is_empty() {
            return Ok(PoolOutcome::default());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(partitions.len())
            .thread_name(|index| format!("worker-{}", index))
            .build()?;
        let halt = AtomicBool::new(false);

        let outcomes: Vec<Result<WorkerResult, BenchError>> = pool.install(|| {
            partitions
                .par_iter()
                .with_max_len(1)
                .map(|partition| self.work(partition, &halt))
                .collect()
        });

        let mut outcome = PoolOutcome { workers: partitions.len(), ..PoolOutcome::default() };
        for (partition, result) in partitions.iter().zip(outcomes) {
            match result {
                Ok(result) => outcome.results.push(result),
                Err(error) if self.policy == FailurePolicy::Abort => return Err(error),
                Err(error) => outcome.failures.push(WorkerFailure { slot: partition.slot, error }),
            }
        }
        Ok(outcome)
    }

    fn work(&self, partition: &Partition, halt: &AtomicBool) -> Result<WorkerResult, BenchError> {
        debug!("worker {} starting with {} queries", partition.slot, partition.descriptors.len());
        let result = self.execute_all(partition, halt);
        match &result {
            Ok(result) => {
                debug!("worker {} finished {} queries", partition.slot, result.query_count)
            }
            Err(err) => {
                debug!("worker {} failed: {}", partition.slot, err);
                if self.policy == FailurePolicy::Abort {
                    halt.store(true, Ordering::SeqCst);
                }
            }
        }
        result
    }

    fn execute_all(
        &self,
        partition: &Partition,
        halt: &AtomicBool,
    ) -> Result<WorkerResult, BenchError> {
        let mut conn = self.engine.connect()?;
        let mut result = WorkerResult::with_capacity(partition.descriptors.len());

        for descriptor in &partition.descriptors {
            if halt.load(Ordering::SeqCst) {
                debug!("worker {} halted", partition.slot);
                break;
            }
            let query = self.template.render(descriptor);
            debug!("from wkr {}: '{}'", partition.slot, query);

            let start = Instant::now();
            let rows = conn.execute(&query)?;
            let elapsed = start.elapsed().as_secs_f64();

            debug!("wkr {}: {} rows in {:.6}s", partition.slot, rows, elapsed);
            result.record(elapsed);
        }
        Ok(result)
    }
}
