//! Job scheduler: registry, bounded admission, event routing, finalization
//! and aggregate progress.
//!
//! Jobs run on their own threads and report back through an `EventSink`.
//! The scheduler reacts on whichever thread delivered the event; nothing here
//! blocks on I/O (history records go to a background writer).

mod admission;
mod finish;
mod guard;
mod progress;
mod registry;
mod router;

pub use admission::admission_slots;
pub use progress::AggregateProgress;

use std::sync::{Arc, Weak};

use crate::config::Settings;
use crate::history::HistoryWriter;
use crate::job::{EventHandler, EventSink, HistoryJob, Job, JobId, JobStatus};
use crate::notify::{AppControl, Notifier};
use crate::recent::RecentTaskManager;
use crate::view::{ListView, ProgressDisplay, ThumbnailView, ViewKey};

use admission::AdmissionGate;
use progress::ProgressTracker;
use registry::{Entry, Registry};

/// Optional collaborators. Any of them may be absent; the scheduler skips
/// the corresponding updates.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub list_view: Option<Arc<dyn ListView>>,
    pub thumbnails: Option<Arc<dyn ThumbnailView>>,
    pub progress: Option<Arc<dyn ProgressDisplay>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub app: Option<Arc<dyn AppControl>>,
}

pub struct SchedulerBuilder {
    settings: Settings,
    collaborators: Collaborators,
    history: Option<HistoryWriter>,
    recent: Option<Arc<RecentTaskManager>>,
}

impl SchedulerBuilder {
    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Send completed jobs to this history writer. Without one, history is not recorded.
    pub fn history(mut self, writer: HistoryWriter) -> Self {
        self.history = Some(writer);
        self
    }

    /// Use an existing recent-task tracker (e.g. one loaded from disk).
    pub fn recent(mut self, recent: Arc<RecentTaskManager>) -> Self {
        self.recent = Some(recent);
        self
    }

    pub fn build(self) -> Scheduler {
        let recent = self
            .recent
            .unwrap_or_else(|| Arc::new(RecentTaskManager::new(self.settings.recent_tasks_max_count)));
        let inner = Arc::new_cyclic(|weak| Inner {
            weak_self: weak.clone(),
            settings: self.settings,
            collab: self.collaborators,
            registry: Registry::default(),
            admission: AdmissionGate::default(),
            progress: ProgressTracker::default(),
            recent,
            history: self.history,
        });
        Scheduler { inner }
    }
}

/// Handle to the scheduler. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    weak_self: Weak<Inner>,
    settings: Settings,
    collab: Collaborators,
    registry: Registry,
    admission: AdmissionGate,
    progress: ProgressTracker,
    recent: Arc<RecentTaskManager>,
    history: Option<HistoryWriter>,
}

impl Scheduler {
    pub fn builder(settings: Settings) -> SchedulerBuilder {
        SchedulerBuilder {
            settings,
            collaborators: Collaborators::default(),
            history: None,
            recent: None,
        }
    }

    /// Register a job, add it to the views and run admission. Submitting a
    /// job that is already registered returns its existing id.
    pub fn submit(&self, job: Arc<dyn Job>) -> JobId {
        self.inner.submit(job)
    }

    /// Stop, unregister and dispose a job. Returns false if it was not registered.
    pub fn remove(&self, id: JobId) -> bool {
        self.inner.remove(id)
    }

    /// Request a stop on every registered job. Queued jobs are stopped first
    /// so a slot freed by a stopping job is not handed to one of them.
    pub fn stop_all(&self) {
        let (queued, rest): (Vec<_>, Vec<_>) = self
            .inner
            .registry
            .snapshot()
            .into_iter()
            .partition(|e| e.job.status() == JobStatus::InQueue);
        for entry in queued.iter().chain(&rest) {
            entry.job.stop();
        }
    }

    /// True while any job is queued or working.
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    /// Start as many queued jobs as the concurrency limit allows.
    pub fn start_tasks(&self) {
        self.inner.start_tasks()
    }

    /// Recompute aggregate progress and refresh the indicators.
    pub fn update_progress_ui(&self) -> AggregateProgress {
        self.inner.update_progress_ui()
    }

    /// Show `progress` on the tray icon; negative restores the default icon.
    pub fn update_tray_icon(&self, progress: i32) {
        self.inner.update_tray_icon(progress)
    }

    /// Populate an empty registry with `History` jobs for each recent task.
    /// Returns how many were added.
    pub fn restore_recent_tasks(&self) -> usize {
        if !self.is_empty() {
            tracing::debug!("registry not empty; recent tasks not restored");
            return 0;
        }
        let tasks = self.inner.recent.tasks();
        for task in &tasks {
            self.submit(Arc::new(HistoryJob::from_recent(task)));
        }
        tasks.len()
    }

    pub fn job(&self, id: JobId) -> Option<Arc<dyn Job>> {
        self.inner.registry.get(id).map(|e| Arc::clone(&e.job))
    }

    pub fn id_of(&self, job: &Arc<dyn Job>) -> Option<JobId> {
        self.inner.registry.find_job(job)
    }

    /// Registered jobs in submission order.
    pub fn jobs(&self) -> Vec<(JobId, Arc<dyn Job>)> {
        self.inner
            .registry
            .snapshot()
            .into_iter()
            .map(|e| (e.id, Arc::clone(&e.job)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn recent(&self) -> &Arc<RecentTaskManager> {
        &self.inner.recent
    }

    pub fn history(&self) -> Option<&HistoryWriter> {
        self.inner.history.as_ref()
    }
}

impl Inner {
    fn submit(&self, job: Arc<dyn Job>) -> JobId {
        if let Some(existing) = self.registry.find_job(&job) {
            tracing::debug!(job = %existing, "job already registered");
            return existing;
        }

        let id = self.registry.allocate_id();
        let info = job.info();
        let item = self
            .collab
            .list_view
            .as_ref()
            .and_then(|v| v.add_item(id, &info));
        let panel = self
            .collab
            .thumbnails
            .as_ref()
            .and_then(|v| v.add_panel(id, &info));

        let entry = Arc::new(Entry::new(id, Arc::clone(&job), item, panel));
        if let Err(existing) = self.registry.insert(entry) {
            // Lost a race with a concurrent submit of the same job.
            self.unbind_views(item, panel);
            return existing;
        }

        if job.status() == JobStatus::History {
            tracing::debug!(job = %id, file = %info.file_name, "history entry added");
            return id;
        }

        let handler: Weak<dyn EventHandler> = self.weak_self.clone();
        job.attach(EventSink::new(id, handler));
        tracing::debug!(job = %id, file = %info.file_name, "job submitted");
        self.start_tasks();
        id
    }

    fn remove(&self, id: JobId) -> bool {
        let Some(entry) = self.registry.get(id) else {
            return false;
        };
        entry.job.stop();
        if self.registry.remove(id).is_none() {
            return false;
        }
        self.unbind_views(entry.item, entry.panel);
        entry.job.dispose();
        tracing::debug!(job = %id, "job removed");
        true
    }

    fn unbind_views(&self, item: Option<ViewKey>, panel: Option<ViewKey>) {
        if let (Some(view), Some(key)) = (&self.collab.list_view, item) {
            view.remove_item(key);
        }
        if let (Some(view), Some(key)) = (&self.collab.thumbnails, panel) {
            view.remove_panel(key);
        }
    }

    fn is_busy(&self) -> bool {
        self.registry
            .snapshot()
            .iter()
            .any(|e| e.job.status().is_busy())
    }

    fn start_tasks(&self) {
        self.admission.run(|| self.admit_once());
    }

    fn admit_once(&self) {
        let entries = self.registry.snapshot();
        let working = entries.iter().filter(|e| e.job.is_working()).count();
        let queued: Vec<&Arc<Entry>> = entries
            .iter()
            .filter(|e| e.job.status() == JobStatus::InQueue)
            .collect();

        let slots = admission_slots(self.settings.upload_limit, working, queued.len());
        if slots == 0 {
            return;
        }
        tracing::debug!(working, queued = queued.len(), slots, "admitting queued jobs");
        for entry in queued.into_iter().take(slots) {
            tracing::debug!(job = %entry.id, "starting job");
            entry.job.start();
        }
    }

    fn update_progress_ui(&self) -> AggregateProgress {
        let percentages: Vec<f64> = self
            .registry
            .snapshot()
            .iter()
            .filter(|e| e.job.status() == JobStatus::Working)
            .filter_map(|e| e.job.info().progress.map(|p| p.percentage))
            .collect();
        let aggregate = AggregateProgress::from_percentages(&percentages);

        if let Some(display) = &self.collab.progress {
            self.progress.render_title(display.as_ref(), aggregate);
        }
        self.update_tray_icon(aggregate.icon_value());
        aggregate
    }

    fn update_tray_icon(&self, progress: i32) {
        if !self.settings.tray_icon_progress_enabled {
            return;
        }
        let Some(display) = &self.collab.progress else {
            return;
        };
        if !display.tray_visible() {
            return;
        }
        self.progress.render_tray(display.as_ref(), progress);
    }
}
