//! Event routing: each job event updates the views bound to that job.

use crate::format;
use crate::job::{EventHandler, JobEvent, JobId, JobStatus};
use crate::view::{Glyph, ItemUpdate};

use super::registry::Entry;
use super::Inner;

impl EventHandler for Inner {
    fn handle(&self, id: JobId, event: JobEvent) {
        let Some(entry) = self.registry.get(id) else {
            // Removed while the event was in flight. Finalization is moot but
            // the slot it held may now be free.
            if event == JobEvent::TaskCompleted {
                self.on_task_completed(None);
            } else {
                tracing::trace!(job = %id, ?event, "event for unregistered job ignored");
            }
            return;
        };

        let _serial = entry.dispatch_lock();
        match event {
            JobEvent::StatusChanged => self.on_status_changed(&entry),
            JobEvent::ProgressChanged => self.on_progress_changed(&entry),
            JobEvent::ImageReady => self.on_image_ready(&entry),
            JobEvent::UploadStarted => self.on_upload_started(&entry),
            JobEvent::UploadCompleted => self.on_upload_completed(&entry),
            JobEvent::TaskCompleted => self.on_task_completed(Some(&entry)),
        }
    }
}

impl Inner {
    pub(super) fn update_item(&self, entry: &Entry, update: ItemUpdate) {
        if let (Some(view), Some(key)) = (&self.collab.list_view, entry.item) {
            view.update_item(key, &update);
        }
    }

    fn on_status_changed(&self, entry: &Entry) {
        let status = entry.job.status();
        let info = entry.job.info();
        tracing::debug!(job = %entry.id, %status, "task status changed");

        let text = if info.status_text.is_empty() {
            status.to_string()
        } else {
            info.status_text
        };
        self.update_item(
            entry,
            ItemUpdate {
                status: Some(text),
                ..ItemUpdate::default()
            },
        );
        self.update_progress_ui();
    }

    fn on_progress_changed(&self, entry: &Entry) {
        // Late progress from a job that already moved on is stale.
        if entry.job.status() != JobStatus::Working {
            return;
        }
        let info = entry.job.info();
        let Some(progress) = info.progress else {
            return;
        };
        let binary = self.settings.binary_units;

        let (progress_text, speed) = match progress.custom_text.as_deref() {
            Some(custom) if !custom.is_empty() => (custom.to_string(), Some(String::new())),
            _ => {
                let text = format!(
                    "{} / {}",
                    format::size(progress.position, binary),
                    format::size(progress.length, binary)
                );
                let speed = (progress.speed > 0.0).then(|| format::speed(progress.speed, binary));
                (text, speed)
            }
        };

        self.update_item(
            entry,
            ItemUpdate {
                status: Some(format::percentage(progress.percentage)),
                progress: Some(progress_text),
                speed,
                elapsed: Some(format::duration(progress.elapsed)),
                remaining: Some(format::duration(progress.remaining)),
                ..ItemUpdate::default()
            },
        );
        if let (Some(view), Some(key)) = (&self.collab.thumbnails, entry.panel) {
            view.update_progress(key, &progress);
        }
        self.update_progress_ui();
    }

    fn on_image_ready(&self, entry: &Entry) {
        if let (Some(view), Some(key)) = (&self.collab.thumbnails, entry.panel) {
            view.update_thumbnail(key, &entry.job.info());
        }
    }

    fn on_upload_started(&self, entry: &Entry) {
        let info = entry.job.info();
        tracing::info!(
            "Upload started. Filename: {}, Filepath: {}",
            info.file_name,
            info.file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );

        self.update_item(
            entry,
            ItemUpdate {
                file_name: Some(info.file_name.clone()),
                status: Some(info.status_text.clone()),
                glyph: Some(Glyph::Transferring),
                ..ItemUpdate::default()
            },
        );
        if let (Some(view), Some(key)) = (&self.collab.thumbnails, entry.panel) {
            view.update_status(key, &info);
            view.set_progress_visible(key, true);
        }
    }

    fn on_upload_completed(&self, entry: &Entry) {
        let info = entry.job.info();
        if let Some(result) = info.result.as_ref().filter(|r| !r.is_error()) {
            if let Some(url) = result.preferred_url() {
                tracing::info!(
                    "Upload completed. Filename: {}, URL: {}, Duration: {} ms",
                    info.file_name,
                    url,
                    info.upload_duration.unwrap_or_default().as_millis()
                );
            }
        }
        if let (Some(view), Some(key)) = (&self.collab.thumbnails, entry.panel) {
            view.set_progress_visible(key, false);
        }
    }
}
