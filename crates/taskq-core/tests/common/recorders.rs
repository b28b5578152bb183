//! Collaborators that record every call for later assertions.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use taskq_core::job::{JobId, JobInfo, Progress};
use taskq_core::notify::{AppControl, Notifier, Popup, Sound, Toast};
use taskq_core::view::{
    Glyph, IconError, ItemUpdate, ListView, ProgressDisplay, ThumbnailView, ViewKey,
};

#[derive(Default)]
pub struct RecordingList {
    next: AtomicU64,
    pub rows: Mutex<Vec<(ViewKey, JobId)>>,
    pub updates: Mutex<Vec<(ViewKey, ItemUpdate)>>,
    pub visible: Mutex<Vec<ViewKey>>,
    pub selected: Mutex<Vec<ViewKey>>,
}

impl RecordingList {
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn key_of(&self, id: JobId) -> Option<ViewKey> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|(_, j)| *j == id)
            .map(|(k, _)| *k)
    }

    /// Every update sent to the row of `id`, in order.
    pub fn updates_for(&self, id: JobId) -> Vec<ItemUpdate> {
        let Some(key) = self.key_of(id) else {
            return Vec::new();
        };
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, u)| u.clone())
            .collect()
    }

    pub fn last_glyph(&self, id: JobId) -> Option<Glyph> {
        self.updates_for(id).iter().rev().find_map(|u| u.glyph)
    }
}

impl ListView for RecordingList {
    fn add_item(&self, id: JobId, _info: &JobInfo) -> Option<ViewKey> {
        let key = ViewKey(self.next.fetch_add(1, Ordering::SeqCst) + 100);
        self.rows.lock().unwrap().push((key, id));
        Some(key)
    }

    fn remove_item(&self, key: ViewKey) {
        self.rows.lock().unwrap().retain(|(k, _)| *k != key);
    }

    fn update_item(&self, key: ViewKey, update: &ItemUpdate) {
        self.updates.lock().unwrap().push((key, update.clone()));
    }

    fn ensure_visible(&self, key: ViewKey) {
        self.visible.lock().unwrap().push(key);
    }

    fn select_single(&self, key: ViewKey) {
        self.selected.lock().unwrap().push(key);
    }
}

#[derive(Default)]
pub struct RecordingThumbs {
    next: AtomicU64,
    pub panels: Mutex<Vec<ViewKey>>,
    pub thumbnails: AtomicUsize,
    pub progress: Mutex<Vec<(ViewKey, f64)>>,
    pub progress_visible: Mutex<Vec<(ViewKey, bool)>>,
}

impl ThumbnailView for RecordingThumbs {
    fn add_panel(&self, _id: JobId, _info: &JobInfo) -> Option<ViewKey> {
        let key = ViewKey(self.next.fetch_add(1, Ordering::SeqCst));
        self.panels.lock().unwrap().push(key);
        Some(key)
    }

    fn remove_panel(&self, key: ViewKey) {
        self.panels.lock().unwrap().retain(|k| *k != key);
    }

    fn update_thumbnail(&self, _key: ViewKey, _info: &JobInfo) {
        self.thumbnails.fetch_add(1, Ordering::SeqCst);
    }

    fn update_status(&self, _key: ViewKey, _info: &JobInfo) {}

    fn update_progress(&self, key: ViewKey, progress: &Progress) {
        self.progress.lock().unwrap().push((key, progress.percentage));
    }

    fn set_progress_visible(&self, key: ViewKey, visible: bool) {
        self.progress_visible.lock().unwrap().push((key, visible));
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub titles: Mutex<Vec<Option<f64>>>,
    pub icons: Mutex<Vec<i32>>,
    pub fail_icons: AtomicBool,
    pub hidden_tray: AtomicBool,
}

impl RecordingDisplay {
    pub fn last_title(&self) -> Option<Option<f64>> {
        self.titles.lock().unwrap().last().copied()
    }

    pub fn icons(&self) -> Vec<i32> {
        self.icons.lock().unwrap().clone()
    }
}

impl ProgressDisplay for RecordingDisplay {
    fn set_title_progress(&self, progress: Option<f64>) {
        self.titles.lock().unwrap().push(progress);
    }

    fn set_taskbar_progress(&self, _progress: Option<u8>) {}

    fn tray_visible(&self) -> bool {
        !self.hidden_tray.load(Ordering::SeqCst)
    }

    fn render_tray_icon(&self, percent: u8) -> Result<(), IconError> {
        if self.fail_icons.load(Ordering::SeqCst) {
            return Err(IconError {
                percent,
                reason: "font missing".into(),
            });
        }
        self.icons.lock().unwrap().push(i32::from(percent));
        Ok(())
    }

    fn reset_tray_icon(&self) {
        self.icons.lock().unwrap().push(-1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Sound(Sound),
    Popup(Popup),
    Toast(Toast),
    AfterUpload(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
    pub fullscreen: AtomicBool,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn popups(&self) -> Vec<Popup> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Popup(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn play_sound(&self, sound: Sound) {
        self.notices.lock().unwrap().push(Notice::Sound(sound));
    }

    fn show_popup(&self, popup: Popup) {
        self.notices.lock().unwrap().push(Notice::Popup(popup));
    }

    fn show_toast(&self, toast: Toast) {
        self.notices.lock().unwrap().push(Notice::Toast(toast));
    }

    fn show_after_upload_window(&self, info: &JobInfo) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::AfterUpload(info.file_name.clone()));
    }

    fn is_active_window_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingApp {
    pub auto_close: AtomicBool,
    pub exits: AtomicUsize,
    pub saves: AtomicUsize,
}

impl RecordingApp {
    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl AppControl for RecordingApp {
    fn auto_close_requested(&self) -> bool {
        self.auto_close.load(Ordering::SeqCst)
    }

    fn exit(&self) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }

    fn save_settings(&self) {
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}
