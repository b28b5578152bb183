//! Display surfaces the scheduler keeps in sync: a list view, a thumbnail
//! panel view, and the window title / tray / taskbar progress indicators.
//!
//! All of them are optional. Rendering is entirely the implementor's business.

use crate::job::{JobId, JobInfo, Progress};

/// Identity of a row or panel, returned by the view when the job is added and
/// stored alongside the job in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewKey(pub u64);

/// Status icon shown next to a list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Transferring,
    Failed,
    Stopped,
    Completed,
}

/// Columns to overwrite on a list row. `None` leaves the column untouched;
/// `Some(String::new())` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub file_name: Option<String>,
    pub status: Option<String>,
    pub progress: Option<String>,
    pub speed: Option<String>,
    pub elapsed: Option<String>,
    pub remaining: Option<String>,
    pub result: Option<String>,
    pub glyph: Option<Glyph>,
}

/// Row-per-job list view.
pub trait ListView: Send + Sync {
    /// Add a row for a newly submitted job. Returning `None` means the view
    /// does not track this job and will receive no updates for it.
    fn add_item(&self, id: JobId, info: &JobInfo) -> Option<ViewKey>;
    fn remove_item(&self, key: ViewKey);
    fn update_item(&self, key: ViewKey, update: &ItemUpdate);
    /// Scroll the row into view.
    fn ensure_visible(&self, key: ViewKey);
    /// Make the row the only selected one.
    fn select_single(&self, key: ViewKey);
}

/// Panel-per-job thumbnail view.
pub trait ThumbnailView: Send + Sync {
    fn add_panel(&self, id: JobId, info: &JobInfo) -> Option<ViewKey>;
    fn remove_panel(&self, key: ViewKey);
    /// Refresh title and image once the job's capture is available.
    fn update_thumbnail(&self, key: ViewKey, info: &JobInfo);
    fn update_status(&self, key: ViewKey, info: &JobInfo);
    fn update_progress(&self, key: ViewKey, progress: &Progress);
    fn set_progress_visible(&self, key: ViewKey, visible: bool);
}

/// Failure to generate a tray icon for a percentage.
#[derive(Debug, thiserror::Error)]
#[error("progress icon for {percent}%: {reason}")]
pub struct IconError {
    pub percent: u8,
    pub reason: String,
}

/// Aggregate progress indicators outside the job list.
pub trait ProgressDisplay: Send + Sync {
    /// `Some(p)` decorates the window title with `p`; `None` restores the plain title.
    fn set_title_progress(&self, progress: Option<f64>);
    /// `None` clears the taskbar progress bar.
    fn set_taskbar_progress(&self, progress: Option<u8>);
    fn tray_visible(&self) -> bool {
        true
    }
    /// Swap the tray icon for one showing `percent`.
    fn render_tray_icon(&self, percent: u8) -> Result<(), IconError>;
    /// Restore the default tray icon.
    fn reset_tray_icon(&self);
}
