//! Finalization of a job that reported `TaskCompleted`, and the teardown that
//! follows every completion.

use crate::config::{PopupNotification, TaskSettings};
use crate::history::HistoryItem;
use crate::job::{JobInfo, JobKind, JobStatus, UploadResult};
use crate::notify::{Notifier, Popup, PopupAction, PopupIcon, Sound, Toast, APP_TITLE, POPUP_TIMEOUT};
use crate::template;
use crate::view::{Glyph, ItemUpdate};

use super::guard::TeardownGuard;
use super::registry::Entry;
use super::Inner;

impl Inner {
    /// `entry` is `None` when the job was removed before its completion was
    /// delivered; only the teardown runs then.
    pub(super) fn on_task_completed(&self, entry: Option<&Entry>) {
        let _teardown = TeardownGuard { inner: self };
        let Some(entry) = entry else {
            return;
        };

        entry.job.set_keep_image(false);
        let info = entry.job.info();
        let Some(result) = info.result.as_ref() else {
            tracing::debug!(job = %entry.id, "task completed without a result");
            return;
        };

        if let (Some(view), Some(key)) = (&self.collab.thumbnails, entry.panel) {
            view.update_status(key, &info);
            view.set_progress_visible(key, false);
        }

        match entry.job.status() {
            JobStatus::Stopped => self.finish_stopped(entry, &info),
            JobStatus::Failed => self.finish_failed(entry, &info, result),
            _ => self.finish_completed(entry, &info, result),
        }

        if let (Some(view), Some(key)) = (&self.collab.list_view, entry.item) {
            view.ensure_visible(key);
            if self.settings.auto_select_last_completed {
                view.select_single(key);
            }
        }
    }

    fn finish_stopped(&self, entry: &Entry, info: &JobInfo) {
        tracing::info!("Task stopped. Filename: {}", info.file_name);
        self.update_item(
            entry,
            ItemUpdate {
                file_name: Some(info.file_name.clone()),
                status: Some(status_text(entry, info)),
                glyph: Some(Glyph::Stopped),
                ..ItemUpdate::default()
            },
        );
    }

    fn finish_failed(&self, entry: &Entry, info: &JobInfo, result: &UploadResult) {
        let errors = result.errors.join("\n\n");
        tracing::warn!("Task failed. Filename: {}, Errors:\n{}", info.file_name, errors);

        self.update_item(
            entry,
            ItemUpdate {
                status: Some(status_text(entry, info)),
                result: Some(String::new()),
                glyph: Some(Glyph::Failed),
                ..ItemUpdate::default()
            },
        );

        let ts = &info.settings;
        if ts.disable_notifications {
            return;
        }
        let Some(notifier) = &self.collab.notifier else {
            return;
        };
        if ts.play_sound_after_upload {
            notifier.play_sound(Sound::Error);
        }
        if ts.popup_notification != PopupNotification::None
            && !errors.is_empty()
            && popups_allowed(ts, notifier.as_ref())
        {
            notifier.show_popup(Popup {
                title: format!("{} - Error", APP_TITLE),
                text: errors,
                icon: PopupIcon::Error,
                timeout: POPUP_TIMEOUT,
                action: None,
            });
        }
    }

    fn finish_completed(&self, entry: &Entry, info: &JobInfo, result: &UploadResult) {
        tracing::info!(
            "Task completed. Filename: {}, Duration: {} ms",
            info.file_name,
            info.task_duration.as_millis()
        );

        let text = info.result_text();
        self.update_item(
            entry,
            ItemUpdate {
                file_name: Some(info.file_name.clone()),
                status: Some(status_text(entry, info)),
                result: (!text.is_empty()).then(|| text.clone()),
                glyph: Some(Glyph::Completed),
                ..ItemUpdate::default()
            },
        );

        if entry.job.stop_requested() || text.is_empty() {
            return;
        }

        if self.settings.history_save_tasks && (!self.settings.history_check_url || result.has_url()) {
            match &self.history {
                Some(history) => history.append(HistoryItem::from(info)),
                None => tracing::trace!("no history writer; record skipped"),
            }
        }
        self.recent.add(info);

        let ts = &info.settings;
        if ts.disable_notifications || info.kind == JobKind::ShareUrl {
            return;
        }
        let Some(notifier) = &self.collab.notifier else {
            return;
        };
        if ts.play_sound_after_upload {
            notifier.play_sound(Sound::TaskCompleted);
        }

        let text = match ts.notification_format.as_deref() {
            Some(format) if !format.is_empty() => template::render(format, info),
            _ => text,
        };
        if text.is_empty() || !popups_allowed(ts, notifier.as_ref()) {
            return;
        }

        match ts.popup_notification {
            PopupNotification::BalloonTip => notifier.show_popup(Popup {
                title: format!("{} - Task completed", APP_TITLE),
                action: Some(PopupAction::OpenUrl(text.clone())),
                text,
                icon: PopupIcon::Info,
                timeout: POPUP_TIMEOUT,
            }),
            PopupNotification::Toast => {
                entry.job.set_keep_image(true);
                let toast = &ts.toast;
                notifier.show_toast(Toast {
                    url: result.preferred_url().unwrap_or_default().to_string(),
                    file_path: info.file_path.clone(),
                    text,
                    duration: secs(toast.duration_secs),
                    fade: secs(toast.fade_secs),
                    placement: toast.placement,
                    width: toast.width,
                    height: toast.height,
                    left_click: toast.left_click,
                    right_click: toast.right_click,
                    middle_click: toast.middle_click,
                });
            }
            PopupNotification::None => {}
        }

        if ts.show_after_upload_window && info.is_upload_job() {
            notifier.show_after_upload_window(info);
        }
    }

    /// Runs after every `TaskCompleted`, however finalization ended.
    pub(super) fn after_task_completed(&self) {
        if let Some(app) = &self.collab.app {
            if app.auto_close_requested() && !self.is_busy() {
                tracing::info!("no jobs left; exiting on auto-close");
                app.exit();
                return;
            }
        }

        self.start_tasks();
        self.update_progress_ui();

        if self.settings.save_settings_after_task_completed && !self.is_busy() {
            if let Some(app) = &self.collab.app {
                app.save_settings();
            }
        }
    }
}

fn status_text(entry: &Entry, info: &JobInfo) -> String {
    if info.status_text.is_empty() {
        entry.job.status().to_string()
    } else {
        info.status_text.clone()
    }
}

fn popups_allowed(ts: &TaskSettings, notifier: &dyn Notifier) -> bool {
    !ts.disable_notifications_on_fullscreen || !notifier.is_active_window_fullscreen()
}

fn secs(value: f32) -> std::time::Duration {
    std::time::Duration::try_from_secs_f32(value).unwrap_or_default()
}
