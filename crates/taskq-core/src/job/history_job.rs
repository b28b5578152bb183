//! Synthetic job rebuilt from a recent-task record. Never runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::TaskSettings;
use crate::recent::RecentTask;

use super::{EventSink, Job, JobInfo, JobKind, JobStatus, UploadResult};

/// A job in the `History` state: visible in views, ignored by admission and
/// the event router.
pub struct HistoryJob {
    info: JobInfo,
    keep_image: AtomicBool,
}

impl HistoryJob {
    pub fn from_recent(task: &RecentTask) -> Self {
        let file_name = task
            .file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| task.url.clone())
            .unwrap_or_default();

        let mut info = JobInfo::new(file_name, JobKind::FileUpload, Arc::new(TaskSettings::default()));
        info.file_path = task.file_path.clone();
        info.status_text = JobStatus::History.as_str().to_string();
        info.finished_at = Some(task.time);
        info.result = Some(UploadResult {
            url: task.url.clone(),
            thumbnail_url: task.thumbnail_url.clone(),
            shortened_url: task.shortened_url.clone(),
            deletion_url: task.deletion_url.clone(),
            errors: Vec::new(),
        });

        Self {
            info,
            keep_image: AtomicBool::new(false),
        }
    }

    pub fn keeps_image(&self) -> bool {
        self.keep_image.load(Ordering::Relaxed)
    }
}

impl Job for HistoryJob {
    fn start(&self) {}

    fn stop(&self) {}

    fn status(&self) -> JobStatus {
        JobStatus::History
    }

    fn info(&self) -> JobInfo {
        self.info.clone()
    }

    fn stop_requested(&self) -> bool {
        false
    }

    fn set_keep_image(&self, keep: bool) {
        self.keep_image.store(keep, Ordering::Relaxed);
    }

    fn attach(&self, _events: EventSink) {}
}
