//! RAII guard that runs post-completion teardown when dropped.

use super::Inner;

/// Runs `Inner::after_task_completed` on drop, so admission, progress and
/// auto-close happen even when finalization returns early or panics.
pub(super) struct TeardownGuard<'a> {
    pub(super) inner: &'a Inner,
}

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::error!("task finalization panicked; running teardown");
        }
        self.inner.after_task_completed();
    }
}
