//! Append-only JSON-lines history log with weekly backups.

use chrono::{DateTime, Datelike, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{HistoryError, HistoryItem};

/// History log at a fixed path. Each record is one JSON line written with a
/// single `write_all` on an append-mode handle, so a record is either fully
/// present or absent.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    backup_dir: Option<PathBuf>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: None,
        }
    }

    /// Before each append, copy the log into `dir` if this ISO week has no backup yet.
    pub fn with_weekly_backup(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the log (and its directory) on first use.
    pub fn append(&self, item: &HistoryItem) -> Result<(), HistoryError> {
        if let Some(dir) = &self.backup_dir {
            if let Err(e) = self.backup_weekly(dir, Utc::now()) {
                tracing::warn!("history backup failed: {}", e);
            }
        }

        let mut line = serde_json::to_string(item)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HistoryError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| HistoryError::io(&self.path, e))?;
        Ok(())
    }

    /// Read every well-formed record in file order. Malformed lines are skipped.
    pub fn read_all(&self) -> Result<Vec<HistoryItem>, HistoryError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HistoryError::io(&self.path, e)),
        };

        let mut items = Vec::new();
        for (n, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryItem>(line) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(line = n + 1, "skipping malformed history record: {}", e),
            }
        }
        Ok(items)
    }

    /// Copy the log to `dir/history-YYYY-Www.jsonl` unless that file already
    /// exists. Returns the backup path when a copy was made.
    pub fn backup_weekly(
        &self,
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<Option<PathBuf>, HistoryError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let week = now.iso_week();
        let target = dir.join(format!("history-{}-W{:02}.jsonl", week.year(), week.week()));
        if target.exists() {
            return Ok(None);
        }
        fs::create_dir_all(dir).map_err(|e| HistoryError::io(dir, e))?;
        fs::copy(&self.path, &target).map_err(|e| HistoryError::io(&target, e))?;
        tracing::debug!(backup = %target.display(), "weekly history backup written");
        Ok(Some(target))
    }
}
