//! Job that works on its own thread and records how many of its kind run at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use taskq_core::config::TaskSettings;
use taskq_core::job::{EventSink, Job, JobEvent, JobInfo, JobKind, JobStatus, Progress, UploadResult};

/// Live/peak counter shared by a batch of jobs.
#[derive(Default)]
pub struct Occupancy {
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl Occupancy {
    fn enter(&self) {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct ThreadedJob {
    shared: Arc<Shared>,
}

struct Shared {
    status: Mutex<JobStatus>,
    info: Mutex<JobInfo>,
    sink: Mutex<Option<EventSink>>,
    occupancy: Arc<Occupancy>,
    work: Duration,
    starts: AtomicUsize,
}

impl ThreadedJob {
    pub fn new(name: &str, work: Duration, occupancy: Arc<Occupancy>) -> Arc<Self> {
        let mut info = JobInfo::new(name, JobKind::FileUpload, Arc::new(TaskSettings::default()));
        info.file_path = Some(format!("/tmp/{name}").into());
        Arc::new(Self {
            shared: Arc::new(Shared {
                status: Mutex::new(JobStatus::InQueue),
                info: Mutex::new(info),
                sink: Mutex::new(None),
                occupancy,
                work,
                starts: AtomicUsize::new(0),
            }),
        })
    }

    pub fn starts(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }
}

impl Job for ThreadedJob {
    fn start(&self) {
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        if self.status() != JobStatus::InQueue {
            return;
        }
        self.shared.occupancy.enter();
        self.shared.info.lock().unwrap().started_at = Some(Utc::now());
        self.shared.set_status(JobStatus::Working);

        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || shared.run());
    }

    fn stop(&self) {}

    fn status(&self) -> JobStatus {
        *self.shared.status.lock().unwrap()
    }

    fn info(&self) -> JobInfo {
        self.shared.info.lock().unwrap().clone()
    }

    fn stop_requested(&self) -> bool {
        false
    }

    fn set_keep_image(&self, _keep: bool) {}

    fn attach(&self, events: EventSink) {
        *self.shared.sink.lock().unwrap() = Some(events);
    }
}

impl Shared {
    fn emit(&self, event: JobEvent) {
        let sink = self.sink.lock().unwrap().clone();
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    fn set_status(&self, status: JobStatus) {
        *self.status.lock().unwrap() = status;
        self.emit(JobEvent::StatusChanged);
    }

    fn run(&self) {
        self.emit(JobEvent::UploadStarted);
        let began = Instant::now();
        let mut step = 0u64;
        while began.elapsed() < self.work {
            step += 1;
            self.info.lock().unwrap().progress = Some(Progress {
                percentage: (step * 10 % 100) as f64,
                position: step,
                length: 10,
                ..Progress::default()
            });
            self.emit(JobEvent::ProgressChanged);
            std::thread::sleep(Duration::from_millis(1));
        }
        self.emit(JobEvent::UploadCompleted);

        {
            let mut info = self.info.lock().unwrap();
            info.progress = None;
            info.result = Some(UploadResult::with_url(format!("https://h/{}", info.file_name)));
            info.finished_at = Some(Utc::now());
        }
        // Leave before the terminal status is visible to admission.
        self.occupancy.leave();
        self.set_status(JobStatus::Completed);
        self.emit(JobEvent::TaskCompleted);
    }
}
