//! Admission: how many queued jobs may start, and the gate that keeps
//! admission passes from overlapping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, TryLockError};

/// Number of queued jobs to start now.
///
/// `limit == 0` admits every queued job; a negative limit admits none.
/// Otherwise the free capacity `limit - working`, clamped to `0..=queued`.
pub fn admission_slots(limit: i32, working: usize, queued: usize) -> usize {
    if queued == 0 {
        return 0;
    }
    if limit == 0 {
        return queued;
    }
    let free = i64::from(limit) - working as i64;
    free.clamp(0, queued as i64) as usize
}

/// Serializes admission passes.
///
/// A request that arrives while a pass is running (from another thread, or
/// re-entrantly from a job that finished inside `start`) does not block; it
/// marks a rerun and the running pass repeats once it is done.
#[derive(Default)]
pub(crate) struct AdmissionGate {
    running: Mutex<()>,
    rerun: AtomicBool,
}

impl AdmissionGate {
    pub(crate) fn run(&self, mut pass: impl FnMut()) {
        self.rerun.store(true, Ordering::SeqCst);
        loop {
            let guard = match self.running.try_lock() {
                Ok(g) => g,
                Err(TryLockError::Poisoned(p)) => p.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            while self.rerun.swap(false, Ordering::SeqCst) {
                pass();
            }
            drop(guard);
            // A request may have landed between the last swap and the unlock.
            if !self.rerun.load(Ordering::SeqCst) {
                return;
            }
        }
    }
}
