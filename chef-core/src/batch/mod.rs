//! Bounded parallel execution of file jobs.

pub mod job;

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{ChefError, Result};
use crate::pipeline::Codec;
use crate::plan::ResourcePlan;
use crate::stats::ProcessingStats;
use crate::store::FileStore;

pub use job::{FileJob, Operation, jobs_for, run_job};

/// Stops dispatch of jobs that have not started yet. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct JobOutcome {
    pub job: FileJob,
    pub result: Result<ProcessingStats>,
}

/// One outcome per submitted job, in submission order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Keyed by input path. When a path was submitted twice the later
    /// outcome wins.
    pub fn by_path(&self) -> BTreeMap<&Path, &Result<ProcessingStats>> {
        self.outcomes
            .iter()
            .map(|o| (o.job.input_path.as_path(), &o.result))
            .collect()
    }

    pub fn total_input(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.input_size)
            .sum()
    }

    pub fn total_output(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.output_size)
            .sum()
    }
}

pub fn run_batch(
    jobs: Vec<FileJob>,
    plan: &ResourcePlan,
    codec: &Codec,
    store: &dyn FileStore,
) -> Result<BatchReport> {
    run_batch_with_cancel(jobs, plan, codec, store, &CancelToken::new())
}

/// Errors only when the pool cannot be set up; per-job failures are
/// recorded in the report.
pub fn run_batch_with_cancel(
    jobs: Vec<FileJob>,
    plan: &ResourcePlan,
    codec: &Codec,
    store: &dyn FileStore,
    cancel: &CancelToken,
) -> Result<BatchReport> {
    if plan.thread_count == 0 || plan.batch_size == 0 {
        return Err(ChefError::Resource(format!(
            "plan needs at least one worker and one job per batch, got {plan:?}"
        )));
    }
    let started = Instant::now();
    let codec = codec.with_chunk_size(plan.chunk_size)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.thread_count)
        .thread_name(|i| format!("chef-worker-{i}"))
        .build()
        .map_err(|e| ChefError::Resource(format!("worker pool: {e}")))?;
    debug!(?plan, jobs = jobs.len(), "starting batch");

    let results: Vec<Vec<Result<ProcessingStats>>> = pool.install(|| {
        jobs.par_chunks(plan.batch_size)
            .map(|group| {
                group
                    .iter()
                    .map(|job| dispatch(job, &codec, store, cancel))
                    .collect()
            })
            .collect()
    });

    let outcomes: Vec<JobOutcome> = jobs
        .into_iter()
        .zip(results.into_iter().flatten())
        .map(|(job, result)| JobOutcome { job, result })
        .collect();
    let report = BatchReport {
        outcomes,
        elapsed: started.elapsed(),
    };
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "batch finished"
    );
    Ok(report)
}

fn dispatch(
    job: &FileJob,
    codec: &Codec,
    store: &dyn FileStore,
    cancel: &CancelToken,
) -> Result<ProcessingStats> {
    if cancel.is_cancelled() {
        return Err(ChefError::Cancelled);
    }
    let result = run_job(job, codec, store);
    match &result {
        Ok(stats) => debug!(
            path = %job.input_path.display(),
            op = %job.operation,
            input = stats.input_size,
            output = stats.output_size,
            "job done"
        ),
        Err(e) => warn!(path = %job.input_path.display(), op = %job.operation, error = %e, "job failed"),
    }
    result
}
