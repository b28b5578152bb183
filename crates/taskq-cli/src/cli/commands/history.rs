//! `taskq history` – print the newest history records.

use anyhow::Result;
use taskq_core::config;
use taskq_core::history::{HistoryItem, HistoryStore};

pub fn run_history(limit: usize) -> Result<()> {
    let store = HistoryStore::new(config::history_path()?);
    let items = store.read_all()?;
    if items.is_empty() {
        println!("No history.");
        return Ok(());
    }

    let skip = items.len().saturating_sub(limit);
    for item in &items[skip..] {
        println!("{}", format_item(item));
    }
    Ok(())
}

fn format_item(item: &HistoryItem) -> String {
    let link = item
        .shortened_url
        .as_deref()
        .or(item.url.as_deref())
        .unwrap_or("-");
    format!(
        "{}  {:<24}  {:>6} ms  {}",
        item.date_time.format("%Y-%m-%d %H:%M:%S"),
        item.file_name,
        item.duration_ms,
        link
    )
}
