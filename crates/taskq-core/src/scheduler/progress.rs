//! Aggregate progress across working jobs and the memoized indicator state.

use std::sync::{Mutex, PoisonError};

use crate::view::ProgressDisplay;

/// Combined progress of every working job that reports a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateProgress {
    Idle,
    /// Arithmetic mean, 0.0 to 100.0.
    Working(f64),
}

impl AggregateProgress {
    pub fn from_percentages(values: &[f64]) -> Self {
        if values.is_empty() {
            return AggregateProgress::Idle;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        AggregateProgress::Working(mean.clamp(0.0, 100.0))
    }

    /// Value handed to the tray icon: the truncated percentage, or `-1` when idle.
    pub fn icon_value(self) -> i32 {
        match self {
            AggregateProgress::Idle => -1,
            AggregateProgress::Working(p) => p as i32,
        }
    }

    /// Title progress in tenths of a percent; what the title actually shows.
    fn title_key(self) -> Option<i64> {
        match self {
            AggregateProgress::Idle => None,
            AggregateProgress::Working(p) => Some((p * 10.0).round() as i64),
        }
    }
}

#[derive(Debug)]
struct Rendered {
    /// `None` until the first render.
    title: Option<Option<i64>>,
    /// `-1` is the default icon.
    icon: i32,
    /// Percentage whose icon failed to generate; not retried until the value moves.
    failed_icon: Option<i32>,
}

/// Remembers what the indicators last showed so identical values are not re-rendered.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    rendered: Mutex<Rendered>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self {
            rendered: Mutex::new(Rendered {
                title: None,
                icon: -1,
                failed_icon: None,
            }),
        }
    }
}

impl ProgressTracker {
    /// Update window title and taskbar if the shown value changed.
    pub(crate) fn render_title(&self, display: &dyn ProgressDisplay, aggregate: AggregateProgress) {
        let key = aggregate.title_key();
        let mut rendered = self.rendered.lock().unwrap_or_else(PoisonError::into_inner);
        if rendered.title == Some(key) {
            return;
        }
        match aggregate {
            AggregateProgress::Idle => {
                display.set_title_progress(None);
                display.set_taskbar_progress(None);
            }
            AggregateProgress::Working(p) => {
                display.set_title_progress(Some(p));
                display.set_taskbar_progress(Some(p as u8));
            }
        }
        rendered.title = Some(key);
    }

    /// Show `progress` on the tray icon (`-1` or below restores the default).
    /// A generation failure falls back to the default icon.
    pub(crate) fn render_tray(&self, display: &dyn ProgressDisplay, progress: i32) {
        let mut rendered = self.rendered.lock().unwrap_or_else(PoisonError::into_inner);
        let progress = progress.max(-1);
        if rendered.failed_icon == Some(progress) {
            return;
        }
        rendered.failed_icon = None;
        if rendered.icon == progress {
            return;
        }

        if progress >= 0 {
            let percent = progress.min(100) as u8;
            if let Err(e) = display.render_tray_icon(percent) {
                tracing::warn!("tray progress icon failed: {}", e);
                rendered.failed_icon = Some(progress);
                if rendered.icon != -1 {
                    display.reset_tray_icon();
                    rendered.icon = -1;
                }
                return;
            }
        } else {
            display.reset_tray_icon();
        }
        rendered.icon = progress;
    }
}
