//! Persist the recent-task list to disk (JSON under XDG state dir).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{RecentTask, RecentTaskManager};

/// On-disk form of the recent-task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRecentTasks {
    #[serde(default = "default_version")]
    pub version: u8,
    pub tasks: Vec<RecentTask>,
}

fn default_version() -> u8 {
    1
}

impl RecentTaskManager {
    /// Save current list to the given path (creates parent dir if needed).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let snapshot = PersistedRecentTasks {
            version: 1,
            tasks: self.tasks(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&snapshot).context("serialize recent tasks")?;
        std::fs::write(path, json)
            .with_context(|| format!("write recent tasks: {}", path.display()))?;
        Ok(())
    }

    /// Load the list from `path`. A missing file yields an empty manager; an
    /// unreadable or malformed file is an error the caller may ignore.
    pub fn load_from_path(path: &Path, max_count: usize) -> Result<RecentTaskManager> {
        let manager = RecentTaskManager::new(max_count);
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(manager),
            Err(e) => {
                return Err(e).with_context(|| format!("read recent tasks: {}", path.display()))
            }
        };
        let snapshot: PersistedRecentTasks = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse recent tasks: {}", path.display()))?;
        manager.replace(snapshot.tasks);
        Ok(manager)
    }
}
