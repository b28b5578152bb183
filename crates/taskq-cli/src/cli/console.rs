//! Terminal implementations of the scheduler's display and notification hooks.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use taskq_core::config::{self, Settings};
use taskq_core::job::{JobId, JobInfo};
use taskq_core::notify::{AppControl, Notifier, Popup, Sound, Toast};
use taskq_core::view::{Glyph, IconError, ItemUpdate, ListView, ProgressDisplay, ViewKey};
use tokio::sync::Notify;

/// Prints one line per finished job.
#[derive(Default)]
pub struct ConsoleList {
    next: AtomicU64,
    names: Mutex<HashMap<ViewKey, (JobId, String)>>,
}

impl ConsoleList {
    fn name(&self, key: ViewKey) -> Option<(JobId, String)> {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }
}

impl ListView for ConsoleList {
    fn add_item(&self, id: JobId, info: &JobInfo) -> Option<ViewKey> {
        let key = ViewKey(self.next.fetch_add(1, Ordering::Relaxed));
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, (id, info.file_name.clone()));
        Some(key)
    }

    fn remove_item(&self, key: ViewKey) {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }

    fn update_item(&self, key: ViewKey, update: &ItemUpdate) {
        let Some((id, name)) = self.name(key) else {
            return;
        };
        let name = update.file_name.as_deref().unwrap_or(&name);
        match update.glyph {
            Some(Glyph::Transferring) => println!("{} copying  {}", id, name),
            Some(Glyph::Completed) => println!(
                "{} done     {}  {}",
                id,
                name,
                update.result.as_deref().unwrap_or_default()
            ),
            Some(Glyph::Failed) => println!("{} failed   {}", id, name),
            Some(Glyph::Stopped) => println!("{} stopped  {}", id, name),
            None => tracing::debug!(
                job = %id,
                status = update.status.as_deref().unwrap_or_default(),
                progress = update.progress.as_deref().unwrap_or_default(),
                speed = update.speed.as_deref().unwrap_or_default(),
                "row update"
            ),
        }
    }

    fn ensure_visible(&self, _key: ViewKey) {}

    fn select_single(&self, _key: ViewKey) {}
}

/// Overall progress on a single stderr line.
pub struct ConsoleProgress;

impl ProgressDisplay for ConsoleProgress {
    fn set_title_progress(&self, progress: Option<f64>) {
        let mut err = std::io::stderr().lock();
        let _ = match progress {
            Some(p) => write!(err, "\rtaskq {:5.1}% ", p),
            None => write!(err, "\r             \r"),
        };
        let _ = err.flush();
    }

    fn set_taskbar_progress(&self, _progress: Option<u8>) {}

    fn tray_visible(&self) -> bool {
        false
    }

    fn render_tray_icon(&self, _percent: u8) -> Result<(), IconError> {
        Ok(())
    }

    fn reset_tray_icon(&self) {}
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn play_sound(&self, sound: Sound) {
        tracing::debug!(?sound, "sound");
    }

    fn show_popup(&self, popup: Popup) {
        println!("{}: {}", popup.title, popup.text);
    }

    fn show_toast(&self, toast: Toast) {
        println!("{}", toast.text);
    }

    fn show_after_upload_window(&self, info: &JobInfo) {
        println!("{} -> {}", info.file_name, info.result_text());
    }
}

/// Auto-closes once the scheduler goes idle.
pub struct ConsoleApp {
    exit: Arc<Notify>,
    settings: Settings,
    config_path: Option<PathBuf>,
}

impl ConsoleApp {
    pub fn new(exit: Arc<Notify>, settings: Settings, config_path: Option<PathBuf>) -> Self {
        Self {
            exit,
            settings,
            config_path,
        }
    }
}

impl AppControl for ConsoleApp {
    fn auto_close_requested(&self) -> bool {
        true
    }

    fn exit(&self) {
        self.exit.notify_one();
    }

    fn save_settings(&self) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        let settings = self.settings.clone();
        std::thread::spawn(move || {
            if let Err(e) = config::save_to(&settings, &path) {
                tracing::warn!("could not save settings: {:#}", e);
            }
        });
    }
}
