//! `taskq run` – copy files as scheduled jobs and wait until all are done.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskq_core::config::{self, Settings};
use taskq_core::history::{HistoryStore, HistoryWriter};
use taskq_core::recent::RecentTaskManager;
use taskq_core::scheduler::{Collaborators, Scheduler};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::cli::console::{ConsoleApp, ConsoleList, ConsoleNotifier, ConsoleProgress};
use crate::cli::copy_job::{self, CopyJob};

pub async fn run_jobs(
    mut cfg: Settings,
    files: &[PathBuf],
    limit: Option<i32>,
    out: &Path,
    no_history: bool,
) -> Result<()> {
    if let Some(limit) = limit {
        cfg.upload_limit = limit;
    }
    if no_history {
        cfg.history_save_tasks = false;
    }
    if cfg.upload_limit < 0 {
        println!("upload limit is negative; no job would start.");
        return Ok(());
    }
    std::fs::create_dir_all(out).with_context(|| format!("create dir: {}", out.display()))?;
    let out = std::fs::canonicalize(out).with_context(|| format!("resolve dir: {}", out.display()))?;
    check_destinations(files, &out)?;

    let recent = Arc::new(load_recent(&cfg));

    let mut history_worker = None;
    let mut builder = Scheduler::builder(cfg.clone()).recent(Arc::clone(&recent));
    if cfg.history_save_tasks {
        let mut store = HistoryStore::new(config::history_path()?);
        if cfg.history_weekly_backup {
            store = store.with_weekly_backup(config::backup_dir()?);
        }
        let (writer, handle) = HistoryWriter::spawn(store, cfg.history_channel_capacity);
        builder = builder.history(writer);
        history_worker = Some(handle);
    }

    let exit = Arc::new(Notify::new());
    let scheduler = builder
        .collaborators(Collaborators {
            list_view: Some(Arc::new(ConsoleList::default())),
            thumbnails: None,
            progress: Some(Arc::new(ConsoleProgress)),
            notifier: Some(Arc::new(ConsoleNotifier)),
            app: Some(Arc::new(ConsoleApp::new(
                Arc::clone(&exit),
                cfg.clone(),
                config::config_path().ok(),
            ))),
        })
        .build();

    let task_settings = Arc::new(cfg.task.clone());
    for file in files {
        let job = CopyJob::new(file.clone(), &out, Arc::clone(&task_settings));
        scheduler.submit(Arc::new(job));
    }
    tracing::info!(jobs = files.len(), limit = cfg.upload_limit, "jobs submitted");

    // Every job may already have finished during submission; the notify
    // permit covers that.
    exit.notified().await;

    let failed = scheduler
        .jobs()
        .iter()
        .filter(|(_, job)| job.status() == taskq_core::JobStatus::Failed)
        .count();

    if let Some(history) = scheduler.history() {
        if let Err(e) = history.flush().await {
            tracing::warn!("history flush: {}", e);
        }
    }
    drop(scheduler);
    if let Some(handle) = history_worker {
        wait_history_worker(handle).await;
    }

    println!(
        "{} job(s) finished, {} failed, {} in recent list",
        files.len(),
        failed,
        recent.len()
    );
    if failed > 0 {
        anyhow::bail!("{} job(s) failed", failed);
    }
    Ok(())
}

/// Two inputs with the same file name would race on one destination.
fn check_destinations(files: &[PathBuf], out: &Path) -> Result<()> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
    for file in files {
        let dest = copy_job::destination(file, out);
        if let Some(first) = seen.insert(dest.clone(), file) {
            anyhow::bail!(
                "{} and {} would both be copied to {}",
                first.display(),
                file.display(),
                dest.display()
            );
        }
    }
    Ok(())
}

/// Returns false if the worker panicked or was cancelled.
async fn wait_history_worker(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("history worker failed: {}", e);
            false
        }
    }
}

fn load_recent(cfg: &Settings) -> RecentTaskManager {
    let path = match config::recent_tasks_path() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("no recent-task path: {:#}", e);
            return RecentTaskManager::new(cfg.recent_tasks_max_count);
        }
    };
    let manager = match RecentTaskManager::load_from_path(&path, cfg.recent_tasks_max_count) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("could not load recent tasks: {:#}", e);
            RecentTaskManager::new(cfg.recent_tasks_max_count)
        }
    };
    if cfg.recent_tasks_save {
        manager.with_save_path(path)
    } else {
        manager
    }
}
