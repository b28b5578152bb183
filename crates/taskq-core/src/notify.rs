//! Notification surface: sounds, popups, toasts and the after-upload window.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ToastClickAction, ToastPlacement};
use crate::job::JobInfo;

pub const APP_TITLE: &str = "taskq";

/// How long a popup stays up.
pub const POPUP_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    TaskCompleted,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupIcon {
    Info,
    Error,
}

/// Action performed when the user clicks a popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupAction {
    OpenUrl(String),
}

/// Short-lived balloon popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub text: String,
    pub icon: PopupIcon,
    pub timeout: Duration,
    pub action: Option<PopupAction>,
}

/// Richer on-screen toast. The job keeps its captured image alive while one is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub url: String,
    pub file_path: Option<PathBuf>,
    pub duration: Duration,
    pub fade: Duration,
    pub placement: ToastPlacement,
    pub width: u32,
    pub height: u32,
    pub left_click: ToastClickAction,
    pub right_click: ToastClickAction,
    pub middle_click: ToastClickAction,
}

pub trait Notifier: Send + Sync {
    fn play_sound(&self, sound: Sound);
    fn show_popup(&self, popup: Popup);
    fn show_toast(&self, toast: Toast);
    /// Open the after-upload window without stealing input focus.
    fn show_after_upload_window(&self, info: &JobInfo);
    /// Used to honour "no notifications over fullscreen windows".
    fn is_active_window_fullscreen(&self) -> bool {
        false
    }
}

/// Process-level controls the scheduler may invoke after a job finishes.
pub trait AppControl: Send + Sync {
    /// An auto-close directive was given at launch.
    fn auto_close_requested(&self) -> bool;
    /// Terminate the application. Only called once nothing is busy.
    fn exit(&self);
    /// Persist settings in the background.
    fn save_settings(&self);
}
