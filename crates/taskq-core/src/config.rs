use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Which popup (if any) is shown when a job finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupNotification {
    None,
    #[default]
    BalloonTip,
    Toast,
}

/// Screen corner (or centre) a toast is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastPlacement {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    #[default]
    BottomRight,
}

/// What a mouse click on a toast does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastClickAction {
    #[default]
    None,
    CloseNotification,
    OpenUrl,
    OpenFile,
    OpenFolder,
    CopyUrl,
    CopyFilePath,
}

/// Toast window appearance and click bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastSettings {
    /// Seconds the toast stays fully visible.
    pub duration_secs: f32,
    /// Seconds spent fading out.
    pub fade_secs: f32,
    pub placement: ToastPlacement,
    pub width: u32,
    pub height: u32,
    pub left_click: ToastClickAction,
    pub right_click: ToastClickAction,
    pub middle_click: ToastClickAction,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            duration_secs: 3.0,
            fade_secs: 1.0,
            placement: ToastPlacement::BottomRight,
            width: 400,
            height: 300,
            left_click: ToastClickAction::OpenUrl,
            right_click: ToastClickAction::CloseNotification,
            middle_click: ToastClickAction::CopyUrl,
        }
    }
}

/// Per-job settings. Each job carries its own snapshot so a settings change
/// mid-run does not alter how an already submitted job is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Suppress sounds, popups and toasts for this job.
    pub disable_notifications: bool,
    /// Suppress popups while the active window is fullscreen.
    pub disable_notifications_on_fullscreen: bool,
    pub play_sound_after_upload: bool,
    pub popup_notification: PopupNotification,
    /// Optional template for the completion popup text (see `template`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_format: Option<String>,
    /// Show the after-upload window (without focus) once an upload finishes.
    pub show_after_upload_window: bool,
    pub toast: ToastSettings,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            disable_notifications: false,
            disable_notifications_on_fullscreen: false,
            play_sound_after_upload: true,
            popup_notification: PopupNotification::BalloonTip,
            notification_format: None,
            show_after_upload_window: false,
            toast: ToastSettings::default(),
        }
    }
}

/// Global configuration loaded from `~/.config/taskq/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of jobs working at once. `0` means unbounded; a
    /// negative value admits nothing.
    pub upload_limit: i32,
    /// Append completed jobs to the history log.
    pub history_save_tasks: bool,
    /// Only record history when the job produced a URL or shortened URL.
    pub history_check_url: bool,
    /// Copy the history log into the backup folder once per ISO week.
    pub history_weekly_backup: bool,
    /// Capacity of the history writer's queue; appends beyond it are dropped.
    pub history_channel_capacity: usize,
    pub auto_select_last_completed: bool,
    /// Format sizes with 1024-based units (KiB) instead of 1000-based (KB).
    pub binary_units: bool,
    pub tray_icon_progress_enabled: bool,
    pub save_settings_after_task_completed: bool,
    /// Persist the recent-task list to disk after every addition.
    pub recent_tasks_save: bool,
    pub recent_tasks_max_count: usize,
    /// Default per-job settings handed to newly created jobs.
    pub task: TaskSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_limit: 5,
            history_save_tasks: true,
            history_check_url: false,
            history_weekly_backup: true,
            history_channel_capacity: 64,
            auto_select_last_completed: false,
            binary_units: true,
            tray_icon_progress_enabled: true,
            save_settings_after_task_completed: false,
            recent_tasks_save: true,
            recent_tasks_max_count: 10,
            task: TaskSettings::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("taskq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Default history log: `~/.local/share/taskq/history.jsonl`.
pub fn history_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("taskq")?;
    Ok(xdg_dirs.place_data_file("history.jsonl")?)
}

/// Folder receiving weekly history backups.
pub fn backup_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("taskq")?;
    Ok(xdg_dirs.get_data_home().join("taskq").join("history_backups"))
}

/// Default recent-task file: `~/.local/state/taskq/recent_tasks.json`.
pub fn recent_tasks_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("taskq")?;
    Ok(xdg_dirs.get_state_home().join("taskq").join("recent_tasks.json"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Settings> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = Settings::default();
        save_to(&default_cfg, &path)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: Settings =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

/// Write settings as pretty TOML, creating the parent directory if needed.
pub fn save_to(cfg: &Settings, path: &std::path::Path) -> Result<()> {
    let toml = toml::to_string_pretty(cfg).context("serialize config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
    Ok(())
}
