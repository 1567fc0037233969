//! Fork-join execution of a classification pass over contiguous index ranges.
//!
//! A pass splits its boxes into at most `workers` disjoint ranges and hands
//! each range to one task on a dedicated rayon pool. Tasks only read the box
//! slice and the opposite [`GroupIndex`]; nothing they share is written
//! except the outcome collection of the locking aggregation strategies.
//!
//! The first failing task records its error and raises an abort flag. Other
//! tasks check the flag before every box and drop their chunk once it is
//! set, and the pass returns the recorded error with no outcomes.

use crate::aggregator::{concat_buffers, SharedOutcomes};
use crate::config::Aggregation;
use crate::error::{EvalError, Result};
use crate::matching::Pass;
use crate::store::GroupIndex;
use crate::types::{BoundingBox, Classification};
use log::{debug, warn};
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

/// Split `0..len` into at most `workers` contiguous, non-empty ranges.
///
/// Range sizes differ by at most one; earlier ranges take the remainder.
///
/// # Example
///
/// ```
/// use bbox_match::scheduler::partition;
///
/// assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
/// assert_eq!(partition(2, 4), vec![0..1, 1..2]);
/// assert!(partition(0, 4).is_empty());
/// ```
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let chunks = workers.max(1).min(len);
    if chunks == 0 {
        return Vec::new();
    }

    let base = len / chunks;
    let remainder = len % chunks;

    let mut ranges = Vec::with_capacity(chunks);
    let mut start = 0;
    for i in 0..chunks {
        let size = base + usize::from(i < remainder);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

/// A bounded pool of worker threads living for one evaluation.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Spawn `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::InvalidWorkerCount` for zero workers and
    /// `EvalError::ThreadPool` if the threads cannot be started.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(EvalError::InvalidWorkerCount(workers));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bbox-match-worker-{i}"))
            .build()?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Everything a task needs to classify its range.
#[derive(Clone, Copy)]
pub struct PassJob<'a> {
    pub pass: Pass,
    pub boxes: &'a [BoundingBox],
    pub opposite: &'a GroupIndex,
    pub iou_threshold: f64,
}

/// Outcomes of one completed pass.
#[derive(Debug)]
pub struct PassOutput {
    pub outcomes: Vec<Classification>,
    pub chunks: usize,
}

/// First-error slot plus the abort flag tasks poll.
struct FailFast {
    aborted: AtomicBool,
    first_error: Mutex<Option<EvalError>>,
}

impl FailFast {
    fn new() -> Self {
        Self {
            aborted: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    fn record(&self, err: EvalError) {
        let mut slot = self.first_error.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
        self.aborted.store(true, Ordering::Release);
    }

    fn into_result(self) -> Result<()> {
        match self.first_error.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Classify every box in `range`, handing each outcome to `emit`.
///
/// Returns `false` if the chunk was abandoned, either because this task
/// failed or because another one did.
fn classify_range(
    job: &PassJob<'_>,
    range: Range<usize>,
    fail: &FailFast,
    mut emit: impl FnMut(Classification),
) -> bool {
    for bbox in &job.boxes[range.clone()] {
        if fail.is_aborted() {
            return false;
        }

        match job.pass.classify(bbox, job.opposite, job.iou_threshold) {
            Ok(outcome) => emit(outcome),
            Err(err) => {
                warn!(
                    "{:?} pass aborting chunk {}..{} at annotation {}: {}",
                    job.pass,
                    range.start,
                    range.end,
                    bbox.annotation_id(),
                    err
                );
                fail.record(err);
                return false;
            }
        }
    }
    true
}

/// Run one pass to completion on `pool`, joining every task before returning.
///
/// # Errors
///
/// Returns the first error any task recorded. Outcomes from the other tasks
/// are discarded.
pub fn run_pass(pool: &WorkerPool, job: PassJob<'_>, aggregation: Aggregation) -> Result<PassOutput> {
    let ranges = partition(job.boxes.len(), pool.workers());
    let chunks = ranges.len();
    debug!(
        "{:?} pass: {} boxes in {} chunks, {:?}",
        job.pass,
        job.boxes.len(),
        chunks,
        aggregation
    );

    let fail = FailFast::new();

    let outcomes = match SharedOutcomes::for_aggregation(aggregation, job.boxes.len()) {
        None => {
            let buffers: Vec<Vec<Classification>> = pool.pool.install(|| {
                ranges
                    .into_par_iter()
                    .map(|range| {
                        let mut buffer = Vec::with_capacity(range.len());
                        classify_range(&job, range, &fail, |outcome| buffer.push(outcome));
                        buffer
                    })
                    .collect()
            });
            fail.into_result()?;
            concat_buffers(buffers)
        }
        Some(shared) => {
            pool.pool.install(|| {
                ranges.into_par_iter().for_each(|range| {
                    classify_range(&job, range, &fail, |outcome| shared.push(outcome));
                });
            });
            fail.into_result()?;
            shared.into_inner()
        }
    };

    Ok(PassOutput { outcomes, chunks })
}
