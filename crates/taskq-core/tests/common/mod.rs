//! Shared fixtures for scheduler integration tests.
#![allow(dead_code)]

pub mod mock_job;
pub mod recorders;
pub mod threaded_job;

use std::sync::Arc;

use taskq_core::config::Settings;
use taskq_core::scheduler::{Collaborators, Scheduler};

use recorders::{RecordingApp, RecordingDisplay, RecordingList, RecordingNotifier, RecordingThumbs};

/// Scheduler wired to recording collaborators.
pub struct Harness {
    pub scheduler: Scheduler,
    pub list: Arc<RecordingList>,
    pub thumbs: Arc<RecordingThumbs>,
    pub display: Arc<RecordingDisplay>,
    pub notifier: Arc<RecordingNotifier>,
    pub app: Arc<RecordingApp>,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::with_builder(settings, |b| b)
    }

    pub fn with_builder(
        settings: Settings,
        configure: impl FnOnce(taskq_core::scheduler::SchedulerBuilder) -> taskq_core::scheduler::SchedulerBuilder,
    ) -> Self {
        let list = Arc::new(RecordingList::default());
        let thumbs = Arc::new(RecordingThumbs::default());
        let display = Arc::new(RecordingDisplay::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let app = Arc::new(RecordingApp::default());
        let collaborators = Collaborators {
            list_view: Some(list.clone()),
            thumbnails: Some(thumbs.clone()),
            progress: Some(display.clone()),
            notifier: Some(notifier.clone()),
            app: Some(app.clone()),
        };
        let scheduler = configure(Scheduler::builder(settings).collaborators(collaborators)).build();
        Self {
            scheduler,
            list,
            thumbs,
            display,
            notifier,
            app,
        }
    }
}

pub fn settings_with_limit(limit: i32) -> Settings {
    Settings {
        upload_limit: limit,
        ..Settings::default()
    }
}
