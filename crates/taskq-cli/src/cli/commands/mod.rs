//! CLI command handlers, one per file.

mod config;
mod history;
mod recent;
mod run;

pub use config::run_config;
pub use history::run_history;
pub use recent::run_recent;
pub use run::run_jobs;
