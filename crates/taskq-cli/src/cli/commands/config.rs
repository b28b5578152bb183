//! `taskq config` – show where settings live and what is in effect.

use anyhow::Result;
use taskq_core::config::{self, Settings};

pub fn run_config(cfg: &Settings) -> Result<()> {
    println!("config:  {}", config::config_path()?.display());
    println!("history: {}", config::history_path()?.display());
    println!("recent:  {}", config::recent_tasks_path()?.display());
    println!();
    println!("{:#?}", cfg);
    Ok(())
}
