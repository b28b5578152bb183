//! Recent-task tracker.
//!
//! A small, bounded list of recently completed jobs kept apart from the full
//! history log so a fresh session can repopulate its view cheaply. Oldest
//! entries are evicted first; the list is optionally persisted as JSON after
//! every addition.

mod persist;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::job::JobInfo;

pub use persist::PersistedRecentTasks;

/// Lightweight record of one completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortened_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_url: Option<String>,
    pub time: DateTime<Utc>,
}

impl RecentTask {
    /// Derive a record from a finished job. `None` when the job has nothing to
    /// show (no URL and no file path).
    pub fn from_info(info: &JobInfo) -> Option<Self> {
        if info.result_text().is_empty() {
            return None;
        }
        let result = info.result.as_ref()?;
        Some(Self {
            file_path: info.file_path.clone(),
            url: result.url.clone(),
            thumbnail_url: result.thumbnail_url.clone(),
            shortened_url: result.shortened_url.clone(),
            deletion_url: result.deletion_url.clone(),
            time: info.finished_at.unwrap_or_else(Utc::now),
        })
    }
}

/// Bounded, ordered recent-task list (oldest first).
#[derive(Debug)]
pub struct RecentTaskManager {
    tasks: Mutex<VecDeque<RecentTask>>,
    max_count: usize,
    save_path: Option<PathBuf>,
}

impl RecentTaskManager {
    pub fn new(max_count: usize) -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            max_count,
            save_path: None,
        }
    }

    /// Persist to `path` after every addition.
    pub fn with_save_path(mut self, path: PathBuf) -> Self {
        self.save_path = Some(path);
        self
    }

    /// Replace the current contents, keeping only the newest `max_count`.
    pub fn replace(&self, tasks: impl IntoIterator<Item = RecentTask>) {
        let mut guard = self.lock();
        guard.clear();
        for task in tasks {
            guard.push_back(task);
        }
        while guard.len() > self.max_count {
            guard.pop_front();
        }
    }

    /// Record a finished job. Jobs with nothing to show are ignored.
    pub fn add(&self, info: &JobInfo) {
        let Some(task) = RecentTask::from_info(info) else {
            return;
        };
        self.push(task);

        if let Some(path) = &self.save_path {
            if let Err(e) = self.save_to_path(path) {
                tracing::warn!("could not save recent tasks to {}: {:#}", path.display(), e);
            }
        }
    }

    pub fn push(&self, task: RecentTask) {
        if self.max_count == 0 {
            return;
        }
        let mut guard = self.lock();
        while guard.len() >= self.max_count {
            guard.pop_front();
        }
        guard.push_back(task);
    }

    /// Snapshot, oldest first.
    pub fn tasks(&self) -> Vec<RecentTask> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<RecentTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
