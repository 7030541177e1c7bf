//! Resource planning for batch runs.
//!
//! A plan is computed once, before any job starts, from the job sizes, a
//! memory budget and a core limit. It never changes while the batch runs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alphabet::Recipe;
use crate::batch::job::FileJob;
use crate::error::{ChefError, Result};
use crate::policy::PlannerPolicy;
use crate::store::FileStore;
use crate::transcode::aligned_unit;

/// UTF-8 width of every glyph in the supported alphabets.
const SYMBOL_UTF8_BYTES: f64 = 4.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePlan {
    /// Bytes per transcoder chunk; always a byte and symbol boundary.
    pub chunk_size: usize,
    pub thread_count: usize,
    pub batch_size: usize,
}

/// Memory the batch may use, in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemoryBudget(pub u64);

impl MemoryBudget {
    pub fn from_mib(mib: u64) -> Self {
        MemoryBudget(mib.saturating_mul(1024 * 1024))
    }

    /// A fraction of the memory the OS currently reports as available.
    /// Zero when the platform reports nothing.
    pub fn detect(fraction: f64) -> Self {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        let available = sys.available_memory();
        let bytes = (available as f64 * fraction.clamp(0.0, 1.0)) as u64;
        debug!(available, budget = bytes, "detected memory budget");
        MemoryBudget(bytes)
    }

    pub fn bytes(self) -> u64 {
        self.0
    }
}

pub fn available_cores() -> usize {
    num_cpus::get().max(1)
}

/// Size summary of a batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchProfile {
    pub file_count: usize,
    pub total_bytes: u64,
    pub largest: u64,
}

impl BatchProfile {
    pub fn from_sizes<I: IntoIterator<Item = u64>>(sizes: I) -> Self {
        sizes.into_iter().fold(Self::default(), |p, s| Self {
            file_count: p.file_count + 1,
            total_bytes: p.total_bytes.saturating_add(s),
            largest: p.largest.max(s),
        })
    }

    /// Unreadable inputs count as empty; the executor reports them.
    pub fn from_jobs(jobs: &[FileJob], store: &dyn FileStore) -> Self {
        Self::from_sizes(jobs.iter().map(|job| {
            store.size(&job.input_path).unwrap_or_else(|e| {
                debug!(path = %job.input_path.display(), error = %e, "size unavailable");
                0
            })
        }))
    }

    pub fn average(&self) -> u64 {
        if self.file_count == 0 {
            0
        } else {
            self.total_bytes.div_ceil(self.file_count as u64)
        }
    }
}

/// Artifact bytes produced per input byte.
pub fn artifact_expansion(bits: u8) -> f64 {
    SYMBOL_UTF8_BYTES * 8.0 / f64::from(bits)
}

pub fn plan_batch(
    jobs: &[FileJob],
    store: &dyn FileStore,
    recipe: Recipe,
    budget: MemoryBudget,
    core_limit: Option<usize>,
    policy: &PlannerPolicy,
) -> Result<ResourcePlan> {
    plan(&BatchProfile::from_jobs(jobs, store), recipe, budget, core_limit, policy)
}

/// `core_limit` of `None` means every logical core.
pub fn plan(
    profile: &BatchProfile,
    recipe: Recipe,
    budget: MemoryBudget,
    core_limit: Option<usize>,
    policy: &PlannerPolicy,
) -> Result<ResourcePlan> {
    policy.validate()?;
    let budget = budget.bytes();
    if budget == 0 {
        return Err(ChefError::Resource("memory budget is zero".into()));
    }
    let cores = match core_limit {
        Some(0) => return Err(ChefError::Resource("core limit is zero".into())),
        Some(n) => n,
        None => available_cores(),
    };

    let bits = recipe.bits_per_symbol();
    let chunk_size = chunk_size(bits, policy);
    if (chunk_size as u64) > budget {
        return Err(ChefError::Resource(format!(
            "memory budget {budget} is smaller than one {chunk_size}-byte chunk"
        )));
    }

    if profile.file_count == 0 {
        let plan = ResourcePlan {
            chunk_size,
            thread_count: 1,
            batch_size: 1,
        };
        debug!(?plan, "empty batch");
        return Ok(plan);
    }

    let headroom = (profile.largest as f64 * policy.compression_factor).ceil() as u64;
    let per_thread = profile
        .largest
        .saturating_add(headroom)
        .saturating_add(policy.fixed_overhead)
        .max(1);
    let by_memory = budget / per_thread;
    if by_memory == 0 {
        return Err(ChefError::Resource(format!(
            "memory budget {budget} cannot hold one worker needing {per_thread} bytes"
        )));
    }
    let thread_count = profile
        .file_count
        .min(cores)
        .min(usize::try_from(by_memory).unwrap_or(usize::MAX));

    let expansion = policy.expansion_factor.unwrap_or_else(|| artifact_expansion(bits));
    let groups = profile.file_count.div_ceil(thread_count);
    let per_job = profile.average() as f64 * expansion;
    let memory_cap = if per_job <= 0.0 {
        usize::MAX
    } else {
        (budget as f64 / per_job).floor() as usize
    };
    let batch_size = groups.min(memory_cap).max(1);

    let plan = ResourcePlan {
        chunk_size,
        thread_count,
        batch_size,
    };
    debug!(
        ?plan,
        files = profile.file_count,
        largest = profile.largest,
        per_thread,
        budget,
        "resource plan"
    );
    Ok(plan)
}

fn chunk_size(bits: u8, policy: &PlannerPolicy) -> usize {
    let unit = aligned_unit(bits);
    let lo = align_up(policy.min_chunk.max(usize::from(bits)), unit);
    let hi = align_down(policy.max_chunk, unit).max(lo);
    let scaled = (policy.default_chunk as f64 * policy.compression_factor).ceil() as usize;
    align_up(scaled, unit).clamp(lo, hi)
}

fn align_up(n: usize, unit: usize) -> usize {
    n.div_ceil(unit).saturating_mul(unit)
}

fn align_down(n: usize, unit: usize) -> usize {
    n / unit * unit
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn files(n: usize, size: u64) -> BatchProfile {
        BatchProfile::from_sizes(std::iter::repeat_n(size, n))
    }

    #[test]
    fn empty_batch_gets_a_single_worker() {
        let p = plan(
            &BatchProfile::default(),
            Recipe::Classic,
            MemoryBudget::from_mib(64),
            Some(4),
            &PlannerPolicy::default(),
        )
        .unwrap();
        assert_eq!((p.thread_count, p.batch_size), (1, 1));
        assert!(p.chunk_size > 0);
    }

    #[test]
    fn zero_budget_and_zero_cores_are_rejected() {
        let pol = PlannerPolicy::default();
        let prof = files(2, 10);
        assert!(matches!(
            plan(&prof, Recipe::Quick, MemoryBudget(0), Some(2), &pol),
            Err(ChefError::Resource(_))
        ));
        assert!(matches!(
            plan(&prof, Recipe::Quick, MemoryBudget::from_mib(64), Some(0), &pol),
            Err(ChefError::Resource(_))
        ));
    }

    #[test]
    fn worker_that_does_not_fit_is_rejected() {
        let r = plan(
            &files(1, 100 * MIB),
            Recipe::Classic,
            MemoryBudget::from_mib(50),
            Some(4),
            &PlannerPolicy::default(),
        );
        assert!(matches!(r, Err(ChefError::Resource(_))));
    }

    #[test]
    fn budget_smaller_than_a_chunk_is_rejected() {
        let r = plan(
            &BatchProfile::default(),
            Recipe::Classic,
            MemoryBudget(1024),
            Some(1),
            &PlannerPolicy::default(),
        );
        assert!(matches!(r, Err(ChefError::Resource(_))));
    }

    #[test]
    fn threads_never_exceed_files() {
        let p = plan(
            &files(3, 1024),
            Recipe::Classic,
            MemoryBudget::from_mib(1024),
            Some(8),
            &PlannerPolicy::default(),
        )
        .unwrap();
        assert_eq!(p.thread_count, 3);
        assert_eq!(p.batch_size, 1);
    }

    #[test]
    fn memory_bounds_threads_and_batches() {
        // per worker ~29 MiB, artifacts ~40 MiB per job at 8 bits
        let p = plan(
            &files(10, 10 * MIB),
            Recipe::Classic,
            MemoryBudget::from_mib(100),
            Some(16),
            &PlannerPolicy::default(),
        )
        .unwrap();
        assert_eq!(p.thread_count, 3);
        assert_eq!(p.batch_size, 2);
    }

    #[test]
    fn batch_size_is_at_least_one() {
        let pol = PlannerPolicy {
            fixed_overhead: 0,
            ..Default::default()
        };
        let p = plan(
            &files(2, 10 * MIB),
            Recipe::Classic,
            MemoryBudget::from_mib(30),
            Some(4),
            &pol,
        )
        .unwrap();
        assert_eq!(p.thread_count, 1);
        assert_eq!(p.batch_size, 1);
    }

    #[test]
    fn chunks_are_aligned_and_bounded() {
        let pol = PlannerPolicy::default();
        for recipe in Recipe::ALL {
            let bits = recipe.bits_per_symbol();
            let p = plan(&files(1, 10), recipe, MemoryBudget::from_mib(64), Some(1), &pol).unwrap();
            assert_eq!(p.chunk_size % aligned_unit(bits), 0, "{recipe}");
            assert!(p.chunk_size >= usize::from(bits));
            assert!(p.chunk_size >= pol.min_chunk && p.chunk_size <= pol.max_chunk);
        }
    }

    #[test]
    fn tiny_chunk_bounds_still_cover_a_symbol() {
        let pol = PlannerPolicy {
            default_chunk: 1,
            min_chunk: 1,
            max_chunk: 1,
            ..Default::default()
        };
        let p = plan(&files(1, 10), Recipe::Gourmet, MemoryBudget::from_mib(64), Some(1), &pol)
            .unwrap();
        assert_eq!(p.chunk_size, 10);
    }

    #[test]
    fn expansion_override_is_used() {
        let pol = PlannerPolicy {
            fixed_overhead: 0,
            expansion_factor: Some(1.0),
            ..Default::default()
        };
        let p = plan(&files(8, MIB), Recipe::Quick, MemoryBudget::from_mib(64), Some(2), &pol)
            .unwrap();
        assert_eq!(p.thread_count, 2);
        assert_eq!(p.batch_size, 4);
    }
}
