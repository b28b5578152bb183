use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::job::{DataKind, JobInfo};

/// One line of the history log: the final outcome of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// When the job finished.
    pub date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub kind: DataKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortened_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_url: Option<String>,
}

impl From<&JobInfo> for HistoryItem {
    fn from(info: &JobInfo) -> Self {
        let result = info.result.clone().unwrap_or_default();
        HistoryItem {
            file_name: info.file_name.clone(),
            file_path: info.file_path.clone(),
            date_time: info.finished_at.unwrap_or_else(Utc::now),
            started_at: info.started_at,
            duration_ms: info.task_duration.as_millis() as u64,
            kind: info.data_kind,
            host: info.uploader_host.clone(),
            url: result.url,
            shortened_url: result.shortened_url,
            thumbnail_url: result.thumbnail_url,
            deletion_url: result.deletion_url,
        }
    }
}
