//! taskq core: schedules submitted jobs under a concurrency limit, routes
//! their lifecycle events to display surfaces, and records completed work in
//! the history log and recent-task list.

pub mod config;
pub mod format;
pub mod history;
pub mod job;
pub mod logging;
pub mod notify;
pub mod recent;
pub mod scheduler;
pub mod template;
pub mod view;

pub use job::{Job, JobEvent, JobId, JobInfo, JobStatus};
pub use scheduler::{Collaborators, Scheduler};
