//! Single-threaded FIFO job scheduler.
//!
//! All jobs run one at a time on a dedicated thread, so everything they do
//! to the index store is serialized. Callers synchronise with indexing
//! through [`Scheduler::wait_until_idle`].

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex};

use crate::config::SchedulerConfig;
use crate::error::{Result, SymdexError};
use crate::job::{Job, JobStatus, ProgressMonitor};

/// Statistics about job execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Total jobs requested.
    pub jobs_submitted: u64,

    /// Jobs whose `execute` returned (successfully or not).
    pub jobs_completed: u64,

    /// Jobs whose `execute` returned an error or panicked.
    pub jobs_failed: u64,

    /// Jobs dropped before starting (family removal, cancellation, shutdown).
    pub jobs_removed: u64,

    /// Times a job was moved to the tail because it was not ready.
    pub jobs_requeued: u64,

    /// Jobs waiting in the queue.
    pub queue_depth: usize,
}

struct QueuedJob {
    id: u64,
    job: Arc<dyn Job>,
    cancelled: Arc<AtomicBool>,
    outcome: Sender<Result<JobStatus>>,
}

impl QueuedJob {
    fn finish(self, outcome: Result<JobStatus>) {
        // The requester may have dropped its ticket.
        let _ = self.outcome.send(outcome);
    }
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<QueuedJob>,
    running: Option<u64>,
    shutdown: bool,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.running.is_none()
    }
}

struct SchedulerInner {
    state: Mutex<QueueState>,
    work_ready: Condvar,
    idle: Condvar,
    next_id: AtomicU64,
    progress: Arc<dyn ProgressMonitor>,
    retry_backoff: Duration,
    jobs_submitted: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    jobs_removed: AtomicU64,
    jobs_requeued: AtomicU64,
}

impl SchedulerInner {
    /// Drop a pending job by id. Returns it if it was still queued.
    fn take_pending(&self, id: u64) -> Option<QueuedJob> {
        let mut state = self.state.lock();
        let position = state.queue.iter().position(|entry| entry.id == id)?;
        let entry = state.queue.remove(position);
        if state.is_idle() {
            self.idle.notify_all();
        }
        entry
    }
}

/// Handle returned by [`Scheduler::request`].
#[derive(Debug)]
pub struct JobTicket {
    id: u64,
    job: Arc<dyn Job>,
    cancelled: Arc<AtomicBool>,
    outcome: Receiver<Result<JobStatus>>,
    scheduler: Weak<SchedulerInner>,
}

impl JobTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the job has been executed or discarded.
    ///
    /// Errors returned by the job's `execute` (for example a
    /// [`SymdexError::StoreIo`] from an indexing job) are handed back here.
    pub fn wait(&self) -> Result<JobStatus> {
        self.outcome.recv().map_err(|_| {
            SymdexError::SchedulerStopped(format!("job {} was never executed", self.id))
        })?
    }

    /// Like [`JobTicket::wait`], giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<JobStatus>> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(SymdexError::SchedulerStopped(
                format!("job {} was never executed", self.id),
            ))),
        }
    }

    /// Cancel the job. A queued job is dropped and reports
    /// [`JobStatus::Cancelled`]; a running job is asked to stop through
    /// [`Job::cancel`] and reports whatever its `execute` decides.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.job.cancel();

        if let Some(inner) = self.scheduler.upgrade() {
            if let Some(entry) = inner.take_pending(self.id) {
                debug!("Cancelled queued job {}", self.id);
                inner.jobs_removed.fetch_add(1, Ordering::Relaxed);
                entry.finish(Ok(JobStatus::Cancelled));
            }
        }
    }
}

/// The job queue and its dedicated execution thread.
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("worker_id", &self.worker_id)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Scheduler {
    /// Start a scheduler thread. `progress` is passed to every job.
    pub fn new(config: &SchedulerConfig, progress: Arc<dyn ProgressMonitor>) -> Result<Self> {
        let inner = Arc::new(SchedulerInner {
            state: Mutex::new(QueueState::default()),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            next_id: AtomicU64::new(1),
            progress,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            jobs_submitted: AtomicU64::new(0),
            jobs_completed: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            jobs_removed: AtomicU64::new(0),
            jobs_requeued: AtomicU64::new(0),
        });

        let worker_inner = Arc::clone(&inner);
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || worker_loop(&worker_inner))?;
        let worker_id = handle.thread().id();
        info!("Started job scheduler thread {:?}", config.thread_name);

        Ok(Scheduler {
            inner,
            worker: Mutex::new(Some(handle)),
            worker_id,
        })
    }

    /// Enqueue a job at the tail of the queue.
    pub fn request(&self, job: Arc<dyn Job>) -> Result<JobTicket> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = bounded(1);

        {
            let mut state = self.inner.state.lock();
            if state.shutdown {
                return Err(SymdexError::SchedulerStopped(format!(
                    "cannot request {job:?}"
                )));
            }
            state.queue.push_back(QueuedJob {
                id,
                job: Arc::clone(&job),
                cancelled: Arc::clone(&cancelled),
                outcome: sender,
            });
        }
        self.inner.jobs_submitted.fetch_add(1, Ordering::Relaxed);
        self.inner.work_ready.notify_one();
        debug!("Requested job {id}: {job:?}");

        Ok(JobTicket {
            id,
            job,
            cancelled,
            outcome: receiver,
            scheduler: Arc::downgrade(&self.inner),
        })
    }

    /// Drop every queued job that belongs to `family`. The running job, if
    /// any, is not interrupted. Returns the number of jobs dropped.
    pub fn remove_family(&self, family: &str) -> usize {
        let removed: Vec<QueuedJob> = {
            let mut state = self.inner.state.lock();
            let (removed, kept): (Vec<_>, Vec<_>) = state
                .queue
                .drain(..)
                .partition(|entry| entry.job.belongs_to(family));
            state.queue = kept.into();
            if state.is_idle() {
                self.inner.idle.notify_all();
            }
            removed
        };

        let count = removed.len();
        self.inner
            .jobs_removed
            .fetch_add(count as u64, Ordering::Relaxed);
        for entry in removed {
            entry.finish(Ok(JobStatus::Removed));
        }
        debug!("Removed {count} queued jobs of family {family:?}");
        count
    }

    /// Block until the queue is empty and no job is executing.
    ///
    /// Fails when called from the scheduler thread itself, where it could
    /// never return.
    pub fn wait_until_idle(&self) -> Result<()> {
        self.check_not_worker()?;
        let mut state = self.inner.state.lock();
        while !state.is_idle() {
            self.inner.idle.wait(&mut state);
        }
        Ok(())
    }

    /// Like [`Scheduler::wait_until_idle`], giving up after `timeout`.
    /// Returns whether the scheduler became idle.
    pub fn wait_until_idle_timeout(&self, timeout: Duration) -> Result<bool> {
        self.check_not_worker()?;
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        while !state.is_idle() {
            if self
                .inner
                .idle
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return Ok(state.is_idle());
            }
        }
        Ok(true)
    }

    /// Whether nothing is queued or executing right now.
    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().is_idle()
    }

    /// Number of jobs queued plus the one executing, if any.
    pub fn awaiting_jobs_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.queue.len() + usize::from(state.running.is_some())
    }

    /// Whether the caller runs on the scheduler thread.
    pub fn is_scheduler_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Get current statistics.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            jobs_submitted: self.inner.jobs_submitted.load(Ordering::Relaxed),
            jobs_completed: self.inner.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.inner.jobs_failed.load(Ordering::Relaxed),
            jobs_removed: self.inner.jobs_removed.load(Ordering::Relaxed),
            jobs_requeued: self.inner.jobs_requeued.load(Ordering::Relaxed),
            queue_depth: self.inner.state.lock().queue.len(),
        }
    }

    /// Stop accepting jobs, run what is queued, and join the thread.
    /// Jobs that are still not ready when the queue drains are removed.
    pub fn shutdown(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;
            self.inner.work_ready.notify_all();
        }

        if self.is_scheduler_thread() {
            warn!("Scheduler shutdown requested from its own thread; not joining");
            return;
        }
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("Job scheduler thread panicked");
            }
        }
        info!("Job scheduler stopped");
    }

    fn check_not_worker(&self) -> Result<()> {
        if self.is_scheduler_thread() {
            return Err(SymdexError::invalid_operation(
                "cannot wait for the scheduler from a job",
            ));
        }
        Ok(())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(inner: &SchedulerInner) {
    loop {
        let entry = {
            let mut state = inner.state.lock();
            loop {
                if let Some(entry) = state.queue.pop_front() {
                    state.running = Some(entry.id);
                    break entry;
                }
                if state.shutdown {
                    return;
                }
                inner.work_ready.wait(&mut state);
            }
        };

        if !entry.job.is_ready_to_run() {
            requeue(inner, entry);
            continue;
        }

        let id = entry.id;
        let outcome = run_job(inner, &entry);
        entry.finish(outcome);

        let mut state = inner.state.lock();
        state.running = None;
        if state.is_idle() {
            inner.idle.notify_all();
        }
        debug!("Finished job {id}");
    }
}

fn requeue(inner: &SchedulerInner, entry: QueuedJob) {
    let mut state = inner.state.lock();
    state.running = None;

    if state.shutdown {
        debug!("Dropping job {} that is not ready at shutdown", entry.id);
        inner.jobs_removed.fetch_add(1, Ordering::Relaxed);
        if state.is_idle() {
            inner.idle.notify_all();
        }
        drop(state);
        entry.finish(Ok(JobStatus::Removed));
        return;
    }

    state.queue.push_back(entry);
    inner.jobs_requeued.fetch_add(1, Ordering::Relaxed);
    drop(state);

    if !inner.retry_backoff.is_zero() {
        thread::sleep(inner.retry_backoff);
    }
}

fn run_job(inner: &SchedulerInner, entry: &QueuedJob) -> Result<JobStatus> {
    let progress = inner.progress.as_ref();
    let result = panic::catch_unwind(AssertUnwindSafe(|| entry.job.execute(progress)));
    inner.jobs_completed.fetch_add(1, Ordering::Relaxed);

    match result {
        Ok(Ok(true)) => Ok(JobStatus::Completed),
        Ok(Ok(false)) if entry.cancelled.load(Ordering::Acquire) => Ok(JobStatus::Cancelled),
        Ok(Ok(false)) => {
            debug!("Job {} ({:?}) was unsuccessful", entry.id, entry.job);
            Ok(JobStatus::Unsuccessful)
        }
        Ok(Err(e)) => {
            inner.jobs_failed.fetch_add(1, Ordering::Relaxed);
            error!("Job {} ({:?}) failed: {e}", entry.id, entry.job);
            Err(e)
        }
        Err(payload) => {
            inner.jobs_failed.fetch_add(1, Ordering::Relaxed);
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Job {} ({:?}) panicked: {message}", entry.id, entry.job);
            Err(SymdexError::job(format!("job {} panicked: {message}", entry.id)))
        }
    }
}
