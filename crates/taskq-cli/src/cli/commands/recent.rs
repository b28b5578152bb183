//! `taskq recent` – print the recent-task list.

use anyhow::Result;
use taskq_core::config::{self, Settings};
use taskq_core::recent::RecentTaskManager;

pub fn run_recent(cfg: &Settings) -> Result<()> {
    let path = config::recent_tasks_path()?;
    let recent = RecentTaskManager::load_from_path(&path, cfg.recent_tasks_max_count)?;
    if recent.is_empty() {
        println!("No recent tasks.");
        return Ok(());
    }
    for task in recent.tasks().iter().rev() {
        let link = task
            .shortened_url
            .as_deref()
            .or(task.url.as_deref())
            .map(str::to_string)
            .or_else(|| task.file_path.as_ref().map(|p| p.display().to_string()))
            .unwrap_or_default();
        println!("{}  {}", task.time.format("%Y-%m-%d %H:%M:%S"), link);
    }
    Ok(())
}
