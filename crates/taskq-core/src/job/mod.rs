//! Job model: identity, status state machine, and the trait the scheduler drives.
//!
//! Jobs own their execution (capture, encoding, network transfer). The
//! scheduler only calls `start`/`stop`, reads snapshots through `info`, and
//! reacts to the events a job emits through the `EventSink` it was attached to.

mod events;
mod history_job;
mod info;

pub use events::{EventSink, JobEvent};
pub(crate) use events::EventHandler;
pub use history_job::HistoryJob;
pub use info::{DataKind, JobInfo, JobKind, Progress, UploadResult};
pub(crate) use info::non_empty;

use std::fmt;

/// Opaque job handle assigned by the scheduler on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Job lifecycle state.
///
/// `InQueue` → `Preparing` → `Working` → one of `Stopped`, `Failed`, `Completed`.
/// A stop request passes through `Stopping`. `History` is entered at creation
/// by synthetic jobs and never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    InQueue,
    Preparing,
    Working,
    Stopping,
    Stopped,
    Failed,
    Completed,
    History,
}

impl JobStatus {
    /// Counts against the concurrency limit.
    pub fn is_working(self) -> bool {
        matches!(
            self,
            JobStatus::Preparing | JobStatus::Working | JobStatus::Stopping
        )
    }

    /// No further transitions except removal from the registry.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Stopped | JobStatus::Failed | JobStatus::Completed | JobStatus::History
        )
    }

    /// Queued or working; what keeps auto-close and settings save waiting.
    pub fn is_busy(self) -> bool {
        self == JobStatus::InQueue || self.is_working()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::InQueue => "In queue",
            JobStatus::Preparing => "Preparing",
            JobStatus::Working => "Working",
            JobStatus::Stopping => "Stopping",
            JobStatus::Stopped => "Stopped",
            JobStatus::Failed => "Failed",
            JobStatus::Completed => "Done",
            JobStatus::History => "History",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work driven by the scheduler.
///
/// Implementations must be internally synchronized: `status`, `info` and the
/// flag accessors are called from whichever thread delivers an event.
/// Accessors must not emit events themselves.
pub trait Job: Send + Sync {
    /// Begin execution. Must move the status out of `InQueue` before returning
    /// so admission never counts the same job as both queued and working.
    fn start(&self);

    /// Cooperative stop request. The job decides when to honour it and
    /// reports the outcome through `JobEvent::TaskCompleted`.
    fn stop(&self);

    /// Release resources once the job has left the registry.
    fn dispose(&self) {}

    fn status(&self) -> JobStatus;

    fn is_working(&self) -> bool {
        self.status().is_working()
    }

    /// Point-in-time snapshot of progress, result and metadata.
    fn info(&self) -> JobInfo;

    /// True once `stop` has been called, even if the job completed anyway.
    fn stop_requested(&self) -> bool;

    /// Whether the job should hold on to its captured image after finishing
    /// (a toast may still be displaying it).
    fn set_keep_image(&self, keep: bool);

    /// Hand the job the sink it reports lifecycle events through. Called once,
    /// on submission, for every job whose status is not `History`.
    fn attach(&self, events: EventSink);
}
