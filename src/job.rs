//! Jobs executed by the scheduler.
//!
//! A job is a capability with exactly four operations: family membership,
//! cooperative cancellation, a readiness predicate and `execute`. Indexing
//! and housekeeping jobs live in [`crate::indexer::jobs`]; [`FnJob`] adapts
//! a closure for anything else.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;

pub mod progress;
pub mod scheduler;

pub use progress::{NullProgressMonitor, ProgressMonitor};
pub use scheduler::{JobTicket, Scheduler, SchedulerStats};

/// A unit of work run on the scheduler thread.
pub trait Job: Send + Sync + Debug {
    /// Whether this job belongs to `family`. Families are path-like tags;
    /// the empty family matches every job.
    fn belongs_to(&self, family: &str) -> bool;

    /// Ask the job to stop. `execute` must observe this cooperatively.
    fn cancel(&self);

    /// Checked right before execution. A job that is not ready is moved to
    /// the tail of the queue.
    fn is_ready_to_run(&self) -> bool;

    /// Run the job, answering whether it succeeded.
    fn execute(&self, progress: &dyn ProgressMonitor) -> Result<bool>;
}

/// Final state of a job as reported to whoever requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// `execute` returned `Ok(true)`.
    Completed,
    /// `execute` returned `Ok(false)` without being cancelled.
    Unsuccessful,
    /// The job was cancelled, either before it started or while running.
    Cancelled,
    /// The job was dropped from the queue by family removal or shutdown
    /// before it started.
    Removed,
}

type JobFn = dyn Fn(&dyn ProgressMonitor) -> Result<bool> + Send + Sync;
type ReadyFn = dyn Fn() -> bool + Send + Sync;

/// A job built from a closure.
///
/// ```
/// use symdex::job::{FnJob, Job, NullProgressMonitor};
///
/// let job = FnJob::new("/p1", |_progress| Ok(true));
/// assert!(job.belongs_to("/p"));
/// assert!(job.belongs_to(""));
/// assert!(!job.belongs_to("/p2"));
/// assert!(job.execute(&NullProgressMonitor).unwrap());
/// ```
pub struct FnJob {
    family: String,
    work: Box<JobFn>,
    ready: Option<Box<ReadyFn>>,
    cancelled: AtomicBool,
}

impl FnJob {
    pub fn new<S, F>(family: S, work: F) -> Self
    where
        S: Into<String>,
        F: Fn(&dyn ProgressMonitor) -> Result<bool> + Send + Sync + 'static,
    {
        FnJob {
            family: family.into(),
            work: Box::new(work),
            ready: None,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Gate execution on `ready`.
    pub fn with_readiness<F>(mut self, ready: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.ready = Some(Box::new(ready));
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Debug for FnJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnJob")
            .field("family", &self.family)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Job for FnJob {
    fn belongs_to(&self, family: &str) -> bool {
        self.family.starts_with(family)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_ready_to_run(&self) -> bool {
        self.ready.as_ref().is_none_or(|ready| ready())
    }

    fn execute(&self, progress: &dyn ProgressMonitor) -> Result<bool> {
        if self.is_cancelled() {
            return Ok(false);
        }
        (self.work)(progress)
    }
}
