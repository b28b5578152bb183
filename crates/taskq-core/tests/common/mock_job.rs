//! Scripted job driven from the test thread.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use taskq_core::config::TaskSettings;
use taskq_core::job::{EventSink, Job, JobEvent, JobInfo, JobKind, JobStatus, Progress, UploadResult};

/// What `start` does besides moving to `Working`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnStart {
    Work,
    /// Fail synchronously inside `start`.
    Fail,
    /// Complete synchronously inside `start`.
    Complete,
}

pub struct MockJob {
    status: Mutex<JobStatus>,
    info: Mutex<JobInfo>,
    sink: Mutex<Option<EventSink>>,
    on_start: OnStart,
    starts: AtomicUsize,
    stop_requested: AtomicBool,
    keep_image: AtomicBool,
    disposed: AtomicBool,
}

impl MockJob {
    pub fn new(name: &str) -> Arc<Self> {
        Self::build(name, JobKind::FileUpload, TaskSettings::default(), OnStart::Work)
    }

    pub fn with_settings(name: &str, kind: JobKind, settings: TaskSettings) -> Arc<Self> {
        Self::build(name, kind, settings, OnStart::Work)
    }

    pub fn with_on_start(name: &str, on_start: OnStart) -> Arc<Self> {
        Self::build(name, JobKind::FileUpload, TaskSettings::default(), on_start)
    }

    fn build(name: &str, kind: JobKind, settings: TaskSettings, on_start: OnStart) -> Arc<Self> {
        let mut info = JobInfo::new(name, kind, Arc::new(settings));
        info.file_path = Some(format!("/tmp/{name}").into());
        Arc::new(Self {
            status: Mutex::new(JobStatus::InQueue),
            info: Mutex::new(info),
            sink: Mutex::new(None),
            on_start,
            starts: AtomicUsize::new(0),
            stop_requested: AtomicBool::new(false),
            keep_image: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn keeps_image(&self) -> bool {
        self.keep_image.load(Ordering::SeqCst)
    }

    pub fn is_attached(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }

    /// Flag a stop request without changing status, as if the job finished
    /// before it could honour it.
    pub fn mark_stop_requested(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn emit(&self, event: JobEvent) {
        let sink = self.sink.lock().unwrap().clone();
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    pub fn set_status(&self, status: JobStatus) {
        *self.status.lock().unwrap() = status;
        self.emit(JobEvent::StatusChanged);
    }

    pub fn progress(&self, percentage: f64) {
        self.info.lock().unwrap().progress = Some(Progress {
            percentage,
            position: (percentage * 10.0) as u64,
            length: 1000,
            speed: 2048.0,
            ..Progress::default()
        });
        self.emit(JobEvent::ProgressChanged);
    }

    pub fn upload_started(&self) {
        self.emit(JobEvent::UploadStarted);
    }

    /// Finish with `result`, emitting `TaskCompleted`.
    pub fn complete(&self, result: UploadResult) {
        self.finish(JobStatus::Completed, result);
    }

    pub fn complete_with_url(&self, url: &str) {
        self.complete(UploadResult::with_url(url));
    }

    pub fn fail(&self, errors: &[&str]) {
        let errors = errors.iter().map(|e| e.to_string()).collect();
        self.finish(JobStatus::Failed, UploadResult::with_errors(errors));
    }

    fn finish(&self, status: JobStatus, result: UploadResult) {
        {
            let mut info = self.info.lock().unwrap();
            info.progress = None;
            info.result = Some(result);
            info.finished_at = Some(Utc::now());
        }
        *self.status.lock().unwrap() = status;
        self.emit(JobEvent::StatusChanged);
        self.emit(JobEvent::TaskCompleted);
    }
}

impl Job for MockJob {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.info.lock().unwrap().started_at = Some(Utc::now());
        self.set_status(JobStatus::Working);
        match self.on_start {
            OnStart::Work => {}
            OnStart::Fail => self.fail(&["could not connect"]),
            OnStart::Complete => self.complete_with_url("https://fast.example/1"),
        }
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        let status = *self.status.lock().unwrap();
        if status == JobStatus::InQueue || status.is_working() {
            self.finish(JobStatus::Stopped, UploadResult::default());
        }
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    fn status(&self) -> JobStatus {
        *self.status.lock().unwrap()
    }

    fn info(&self) -> JobInfo {
        self.info.lock().unwrap().clone()
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn set_keep_image(&self, keep: bool) {
        self.keep_image.store(keep, Ordering::SeqCst);
    }

    fn attach(&self, events: EventSink) {
        *self.sink.lock().unwrap() = Some(events);
    }
}
