//! Ordered set of submitted jobs.
//!
//! Readers take a snapshot of the entry list and iterate that, so a job
//! submitted or removed mid-iteration never invalidates an in-flight pass.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::job::{Job, JobId};
use crate::view::ViewKey;

/// A registered job plus the view rows it is bound to.
pub(crate) struct Entry {
    pub(crate) id: JobId,
    pub(crate) job: Arc<dyn Job>,
    pub(crate) item: Option<ViewKey>,
    pub(crate) panel: Option<ViewKey>,
    dispatch: Mutex<()>,
}

impl Entry {
    pub(crate) fn new(
        id: JobId,
        job: Arc<dyn Job>,
        item: Option<ViewKey>,
        panel: Option<ViewKey>,
    ) -> Self {
        Self {
            id,
            job,
            item,
            panel,
            dispatch: Mutex::new(()),
        }
    }

    /// Held while one of this job's events is being handled. Events for
    /// different jobs do not contend.
    pub(crate) fn dispatch_lock(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn same_job(a: &Arc<dyn Job>, b: &Arc<dyn Job>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: RwLock<Vec<Arc<Entry>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn allocate_id(&self) -> JobId {
        JobId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Append `entry` unless its job is already registered, in which case the
    /// existing id is returned as the error.
    pub(crate) fn insert(&self, entry: Arc<Entry>) -> Result<(), JobId> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.iter().find(|e| same_job(&e.job, &entry.job)) {
            return Err(existing.id);
        }
        entries.push(entry);
        Ok(())
    }

    pub(crate) fn find_job(&self, job: &Arc<dyn Job>) -> Option<JobId> {
        self.read().iter().find(|e| same_job(&e.job, job)).map(|e| e.id)
    }

    pub(crate) fn get(&self, id: JobId) -> Option<Arc<Entry>> {
        self.read().iter().find(|e| e.id == id).cloned()
    }

    pub(crate) fn remove(&self, id: JobId) -> Option<Arc<Entry>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let pos = entries.iter().position(|e| e.id == id)?;
        Some(entries.remove(pos))
    }

    /// Entries in submission order at the time of the call.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Entry>> {
        self.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<Entry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{HistoryJob, Job};
    use crate::recent::RecentTask;
    use chrono::Utc;

    fn history_job() -> Arc<dyn Job> {
        Arc::new(HistoryJob::from_recent(&RecentTask {
            file_path: None,
            url: Some("https://x/1".into()),
            thumbnail_url: None,
            shortened_url: None,
            deletion_url: None,
            time: Utc::now(),
        }))
    }

    #[test]
    fn insert_rejects_same_job_twice() {
        let reg = Registry::default();
        let job = history_job();
        let id = reg.allocate_id();
        reg.insert(Arc::new(Entry::new(id, Arc::clone(&job), None, None)))
            .unwrap();
        let again = Arc::new(Entry::new(reg.allocate_id(), Arc::clone(&job), None, None));
        assert_eq!(reg.insert(again), Err(id));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find_job(&job), Some(id));
    }

    #[test]
    fn snapshot_survives_removal() {
        let reg = Registry::default();
        let a = reg.allocate_id();
        let b = reg.allocate_id();
        reg.insert(Arc::new(Entry::new(a, history_job(), None, None))).unwrap();
        reg.insert(Arc::new(Entry::new(b, history_job(), None, None))).unwrap();

        let snap = reg.snapshot();
        assert!(reg.remove(a).is_some());
        assert!(reg.remove(a).is_none());
        assert_eq!(snap.len(), 2);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(a).is_none());
        assert_eq!(reg.get(b).map(|e| e.id), Some(b));
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let reg = Registry::default();
        let a = reg.allocate_id();
        let b = reg.allocate_id();
        assert!(b > a);
    }
}
