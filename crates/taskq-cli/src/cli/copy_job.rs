//! A job that copies one file into a destination folder on its own thread,
//! reporting progress as it goes. The result URL is the `file://` URL of the copy.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use taskq_core::config::TaskSettings;
use taskq_core::job::{
    DataKind, EventSink, Job, JobEvent, JobInfo, JobKind, JobStatus, Progress, UploadResult,
};

const CHUNK_SIZE: usize = 256 * 1024;
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

pub struct CopyJob {
    shared: Arc<Shared>,
}

struct Shared {
    source: PathBuf,
    dest: PathBuf,
    status: Mutex<JobStatus>,
    info: Mutex<JobInfo>,
    sink: Mutex<Option<EventSink>>,
    stop: AtomicBool,
}

enum Outcome {
    Copied,
    Stopped,
}

/// Where `source` lands when copied into `dest_dir`.
pub fn destination(source: &Path, dest_dir: &Path) -> PathBuf {
    dest_dir.join(file_name(source))
}

fn file_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string())
}

impl CopyJob {
    pub fn new(source: PathBuf, dest_dir: &Path, settings: Arc<TaskSettings>) -> Self {
        let file_name = file_name(&source);
        let dest = destination(&source, dest_dir);

        let mut info = JobInfo::new(file_name, JobKind::FileUpload, settings);
        info.file_path = Some(source.clone());
        info.data_kind = DataKind::File;
        info.uploader_host = Some("local".to_string());

        Self {
            shared: Arc::new(Shared {
                source,
                dest,
                status: Mutex::new(JobStatus::InQueue),
                info: Mutex::new(info),
                sink: Mutex::new(None),
                stop: AtomicBool::new(false),
            }),
        }
    }
}

impl Job for CopyJob {
    fn start(&self) {
        if self.status() != JobStatus::InQueue {
            return;
        }
        self.shared.info().started_at = Some(Utc::now());
        self.shared.set_status(JobStatus::Preparing);

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("taskq-copy".to_string())
            .spawn(move || shared.run());
        if let Err(e) = spawned {
            self.shared
                .finish(JobStatus::Failed, UploadResult::with_errors(vec![format!("spawn worker: {}", e)]));
        }
    }

    fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if self.status() == JobStatus::InQueue {
            self.shared.finish(JobStatus::Stopped, UploadResult::default());
        } else if self.status().is_working() {
            self.shared.set_status(JobStatus::Stopping);
        }
    }

    fn status(&self) -> JobStatus {
        *self.shared.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn info(&self) -> JobInfo {
        self.shared.info().clone()
    }

    fn stop_requested(&self) -> bool {
        self.shared.stop.load(Ordering::SeqCst)
    }

    fn set_keep_image(&self, keep: bool) {
        // Copies hold no image in memory.
        tracing::trace!(keep, "keep-image ignored for copy job");
    }

    fn attach(&self, events: EventSink) {
        *self.shared.sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(events);
    }
}

impl Shared {
    fn info(&self) -> std::sync::MutexGuard<'_, JobInfo> {
        self.info.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: JobEvent) {
        let sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    fn set_status(&self, status: JobStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
        self.emit(JobEvent::StatusChanged);
    }

    fn run(&self) {
        if !self.stop.load(Ordering::SeqCst) {
            self.set_status(JobStatus::Working);
            self.emit(JobEvent::UploadStarted);
        }

        let began = Instant::now();
        match self.copy() {
            Ok(Outcome::Copied) => {
                self.info().upload_duration = Some(began.elapsed());
                self.emit(JobEvent::UploadCompleted);
                let dest = match std::fs::canonicalize(&self.dest) {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!("resolve {}: {}", self.dest.display(), e);
                        self.dest.clone()
                    }
                };
                let result = match url::Url::from_file_path(&dest) {
                    Ok(url) => UploadResult::with_url(url.to_string()),
                    Err(()) => {
                        tracing::warn!("no file URL for {}", dest.display());
                        UploadResult::default()
                    }
                };
                self.info().file_path = Some(dest);
                self.finish(JobStatus::Completed, result);
            }
            Ok(Outcome::Stopped) => {
                if let Err(e) = std::fs::remove_file(&self.dest) {
                    tracing::debug!("partial copy {} not removed: {}", self.dest.display(), e);
                }
                self.finish(JobStatus::Stopped, UploadResult::default());
            }
            Err(e) => {
                self.finish(JobStatus::Failed, UploadResult::with_errors(vec![format!("{:#}", e)]));
            }
        }
    }

    fn copy(&self) -> Result<Outcome> {
        let mut src = File::open(&self.source)
            .with_context(|| format!("open {}", self.source.display()))?;
        let length = src
            .metadata()
            .with_context(|| format!("stat {}", self.source.display()))?
            .len();
        if let Some(parent) = self.dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        if self.copies_onto_source()? {
            anyhow::bail!(
                "{} and {} are the same file",
                self.source.display(),
                self.dest.display()
            );
        }
        let mut dst = File::create(&self.dest)
            .with_context(|| format!("create {}", self.dest.display()))?;

        let started = Instant::now();
        let mut last_report: Option<Instant> = None;
        let mut position = 0u64;
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(Outcome::Stopped);
            }
            let n = src
                .read(&mut buf)
                .with_context(|| format!("read {}", self.source.display()))?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n])
                .with_context(|| format!("write {}", self.dest.display()))?;
            position += n as u64;

            if last_report.map_or(true, |t| t.elapsed() >= PROGRESS_INTERVAL) {
                last_report = Some(Instant::now());
                self.report(position, length, started.elapsed());
            }
        }
        dst.flush()
            .with_context(|| format!("flush {}", self.dest.display()))?;
        Ok(Outcome::Copied)
    }

    /// True when the destination already exists and resolves to the source.
    fn copies_onto_source(&self) -> Result<bool> {
        let dest = match std::fs::canonicalize(&self.dest) {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e).with_context(|| format!("resolve {}", self.dest.display())),
        };
        let source = std::fs::canonicalize(&self.source)
            .with_context(|| format!("resolve {}", self.source.display()))?;
        Ok(source == dest)
    }

    fn report(&self, position: u64, length: u64, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        let speed = if secs > 0.0 { position as f64 / secs } else { 0.0 };
        let remaining = if speed > 0.0 {
            Duration::from_secs_f64(length.saturating_sub(position) as f64 / speed)
        } else {
            Duration::ZERO
        };
        let percentage = if length == 0 {
            100.0
        } else {
            position as f64 * 100.0 / length as f64
        };
        self.info().progress = Some(Progress {
            percentage,
            position,
            length,
            speed,
            elapsed,
            remaining,
            custom_text: None,
        });
        self.emit(JobEvent::ProgressChanged);
    }

    fn finish(&self, status: JobStatus, result: UploadResult) {
        {
            let mut info = self.info();
            let finished = Utc::now();
            info.progress = None;
            info.result = Some(result);
            info.finished_at = Some(finished);
            if let Some(started) = info.started_at {
                info.task_duration = (finished - started).to_std().unwrap_or_default();
            }
        }
        self.set_status(status);
        self.emit(JobEvent::TaskCompleted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for_terminal(job: &CopyJob) -> JobStatus {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = job.status();
            if status.is_terminal() || Instant::now() > deadline {
                return status;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn copies_file_and_reports_file_url() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("data.bin");
        let body: Vec<u8> = (0u8..=255).cycle().take(CHUNK_SIZE * 2 + 17).collect();
        std::fs::write(&source, &body).unwrap();

        let job = CopyJob::new(source, out_dir.path(), Arc::new(TaskSettings::default()));
        job.start();
        assert_eq!(wait_for_terminal(&job), JobStatus::Completed);

        let copied = std::fs::read(out_dir.path().join("data.bin")).unwrap();
        assert_eq!(copied, body);
        let info = job.info();
        let url = info.result.and_then(|r| r.url).unwrap();
        assert!(url.starts_with("file://"), "{}", url);
        assert!(url.ends_with("/data.bin"), "{}", url);
        assert!(info.progress.is_none());
    }

    #[test]
    fn missing_source_fails_with_error() {
        let out_dir = tempfile::tempdir().unwrap();
        let job = CopyJob::new(
            out_dir.path().join("nope.txt"),
            &out_dir.path().join("out"),
            Arc::new(TaskSettings::default()),
        );
        job.start();
        assert_eq!(wait_for_terminal(&job), JobStatus::Failed);
        let result = job.info().result.unwrap();
        assert!(result.is_error());
        assert!(result.errors[0].contains("nope.txt"), "{:?}", result.errors);
    }

    #[test]
    fn stop_before_start_finishes_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let job = CopyJob::new(dir.path().join("a"), dir.path(), Arc::new(TaskSettings::default()));
        job.stop();
        assert_eq!(job.status(), JobStatus::Stopped);
        assert!(job.stop_requested());
        job.start();
        assert_eq!(job.status(), JobStatus::Stopped);
    }

    #[test]
    fn copy_into_own_folder_fails_and_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("keep.txt");
        std::fs::write(&source, b"precious data").unwrap();

        let job = CopyJob::new(source.clone(), dir.path(), Arc::new(TaskSettings::default()));
        job.start();
        assert_eq!(wait_for_terminal(&job), JobStatus::Failed);

        assert_eq!(std::fs::read(&source).unwrap(), b"precious data");
        let result = job.info().result.unwrap();
        assert!(result.url.is_none());
        assert!(result.errors[0].contains("same file"), "{:?}", result.errors);
    }

    #[test]
    fn relative_out_dir_still_yields_file_url() {
        let dir = tempfile::tempdir_in(".").unwrap();
        let rel = if dir.path().is_relative() {
            dir.path().to_path_buf()
        } else {
            let cwd = std::env::current_dir().unwrap();
            dir.path().strip_prefix(&cwd).unwrap().to_path_buf()
        };
        assert!(rel.is_relative());
        let source = rel.join("rel.txt");
        std::fs::write(&source, b"abc").unwrap();

        let job = CopyJob::new(source, &rel.join("out"), Arc::new(TaskSettings::default()));
        job.start();
        assert_eq!(wait_for_terminal(&job), JobStatus::Completed);

        let info = job.info();
        assert!(info.file_path.as_deref().unwrap().is_absolute());
        let url = info.result.and_then(|r| r.url).unwrap();
        assert!(url.starts_with("file://"), "{}", url);
        assert!(url.ends_with("/out/rel.txt"), "{}", url);
    }

    #[test]
    fn start_leaves_queue_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("s.txt");
        std::fs::write(&source, b"hello").unwrap();
        let job = CopyJob::new(source, &dir.path().join("out"), Arc::new(TaskSettings::default()));
        job.start();
        assert_ne!(job.status(), JobStatus::InQueue);
        assert_eq!(wait_for_terminal(&job), JobStatus::Completed);
    }
}
