//! Human-readable sizes, rates and durations for progress columns.

use std::time::Duration;

const BINARY_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
const DECIMAL_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count with up to two decimals, e.g. `1.5 MiB` (binary) or `1.57 MB`.
pub fn size(bytes: u64, binary: bool) -> String {
    let (base, units) = if binary {
        (1024.0, &BINARY_UNITS)
    } else {
        (1000.0, &DECIMAL_UNITS)
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= base && unit < units.len() - 1 {
        value /= base;
        unit += 1;
    }

    if unit == 0 {
        return format!("{} B", bytes);
    }
    format!("{} {}", trim_decimals(value), units[unit])
}

/// Formats a transfer rate in bytes per second, e.g. `512 KiB/s`.
pub fn speed(bytes_per_sec: f64, binary: bool) -> String {
    format!("{}/s", size(bytes_per_sec.max(0.0) as u64, binary))
}

/// Formats a percentage with one decimal, e.g. `42.5%`.
pub fn percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// `mm:ss`, prefixed with total hours (`h:mm:ss`) once an hour has passed.
pub fn duration(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

fn trim_decimals(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
