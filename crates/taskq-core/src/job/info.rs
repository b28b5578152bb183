//! Snapshot of a job's metadata, progress and outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::TaskSettings;

/// What the job does. Drives notification suppression and upload-only behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobKind {
    /// Capture kept locally, nothing transferred.
    Capture,
    /// Capture followed by an upload.
    CaptureUpload,
    #[default]
    FileUpload,
    TextUpload,
    ShortenUrl,
    /// Shares an existing URL; completion is silent.
    ShareUrl,
}

impl JobKind {
    /// Whether the job transfers data to a remote host.
    pub fn is_upload(self) -> bool {
        !matches!(self, JobKind::Capture | JobKind::ShareUrl)
    }
}

/// Kind of payload, recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Image,
    Text,
    #[default]
    File,
    Url,
}

/// Transfer progress. Only present while the job is `Working`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    /// 0.0 to 100.0.
    pub percentage: f64,
    pub position: u64,
    pub length: u64,
    /// Bytes per second.
    pub speed: f64,
    pub elapsed: Duration,
    pub remaining: Duration,
    /// Replaces the position/length column when set (e.g. "Encoding...").
    pub custom_text: Option<String>,
}

/// Outcome of a finished job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadResult {
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub shortened_url: Option<String>,
    pub deletion_url: Option<String>,
    /// Fatal errors for failed jobs, non-fatal warnings for completed ones.
    pub errors: Vec<String>,
}

impl UploadResult {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_errors(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    /// Errors were reported and no URL was produced.
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty() && non_empty(&self.url).is_none()
    }

    /// Shortened URL when available, else the primary URL.
    pub fn preferred_url(&self) -> Option<&str> {
        non_empty(&self.shortened_url).or_else(|| non_empty(&self.url))
    }

    /// At least one of the primary or shortened URLs is present.
    pub fn has_url(&self) -> bool {
        non_empty(&self.url).is_some() || non_empty(&self.shortened_url).is_some()
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Point-in-time snapshot returned by `Job::info`.
#[derive(Debug, Clone)]
pub struct JobInfo {
    pub file_name: String,
    pub file_path: Option<PathBuf>,
    /// Localised status line shown in the list view.
    pub status_text: String,
    pub kind: JobKind,
    pub data_kind: DataKind,
    pub uploader_host: Option<String>,
    pub settings: Arc<TaskSettings>,
    pub progress: Option<Progress>,
    pub result: Option<UploadResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Wall time from start to finish.
    pub task_duration: Duration,
    /// Time spent in the transfer phase, if there was one.
    pub upload_duration: Option<Duration>,
}

impl JobInfo {
    pub fn new(file_name: impl Into<String>, kind: JobKind, settings: Arc<TaskSettings>) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: None,
            status_text: String::new(),
            kind,
            data_kind: DataKind::default(),
            uploader_host: None,
            settings,
            progress: None,
            result: None,
            started_at: None,
            finished_at: None,
            task_duration: Duration::ZERO,
            upload_duration: None,
        }
    }

    pub fn is_upload_job(&self) -> bool {
        self.kind.is_upload()
    }

    /// Text that represents the job's outcome: the preferred URL, falling back
    /// to the local file path for jobs that produced no URL. Empty when there
    /// is no result yet.
    pub fn result_text(&self) -> String {
        let Some(result) = &self.result else {
            return String::new();
        };
        if let Some(url) = result.preferred_url() {
            return url.to_string();
        }
        if result.is_error() {
            return String::new();
        }
        self.file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}
