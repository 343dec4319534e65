//! Progress reporting handle forwarded to jobs.

use std::fmt::Debug;

/// Receives progress from running jobs. The scheduler never inspects it;
/// it only hands the same handle to every `execute` call.
pub trait ProgressMonitor: Send + Sync + Debug {
    fn begin_task(&self, _name: &str, _total_work: usize) {}

    fn worked(&self, _work: usize) {}

    /// Whether the owner of the monitor asked for cancellation.
    fn is_canceled(&self) -> bool {
        false
    }

    fn done(&self) {}
}

/// A monitor that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressMonitor;

impl ProgressMonitor for NullProgressMonitor {}
