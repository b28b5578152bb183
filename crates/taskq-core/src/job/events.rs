//! Lifecycle signals a job emits, and the sink it emits them through.

use std::sync::{Arc, Weak};

use super::JobId;

/// Lifecycle signal emitted by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobEvent {
    StatusChanged,
    /// Only meaningful while the job is `Working`; late deliveries are ignored.
    ProgressChanged,
    /// A captured image is available for thumbnails.
    ImageReady,
    UploadStarted,
    /// The transfer phase finished (the job may still have post-upload work).
    UploadCompleted,
    /// Final event; the job is in a terminal state.
    TaskCompleted,
}

/// Receiver side of a sink. Implemented by the scheduler.
pub(crate) trait EventHandler: Send + Sync {
    fn handle(&self, id: JobId, event: JobEvent);
}

/// Handle a job uses to report events to the scheduler it was submitted to.
///
/// Holds only a weak reference: a job that outlives its scheduler emits into
/// the void rather than keeping the scheduler alive.
#[derive(Clone)]
pub struct EventSink {
    id: JobId,
    handler: Weak<dyn EventHandler>,
}

impl EventSink {
    pub(crate) fn new(id: JobId, handler: Weak<dyn EventHandler>) -> Self {
        Self { id, handler }
    }

    /// Sink whose events go nowhere. Useful for jobs driven outside a scheduler.
    pub fn detached(id_hint: u64) -> Self {
        let handler: Weak<dyn EventHandler> = Weak::<Detached>::new();
        Self {
            id: JobId::new(id_hint),
            handler,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.id
    }

    /// Deliver `event` synchronously on the calling thread. Handling for one
    /// job is serialized by the scheduler; handlers for different jobs may run
    /// concurrently.
    pub fn emit(&self, event: JobEvent) {
        match self.handler.upgrade() {
            Some(handler) => handler.handle(self.id, event),
            None => tracing::trace!(job = %self.id, ?event, "event dropped: scheduler gone"),
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("id", &self.id)
            .field("attached", &(self.handler.strong_count() > 0))
            .finish()
    }
}

struct Detached;

impl EventHandler for Detached {
    fn handle(&self, _id: JobId, _event: JobEvent) {}
}
