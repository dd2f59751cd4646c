use chrono::{DateTime, Local};
use sorteio_core::HistoryEntry;
use std::collections::HashMap;

/// Sort entries by draw timestamp, newest first. Entries with equal
/// timestamps keep their relative order.
pub fn newest_first(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.sort_by(|a, b| b.draw.timestamp.cmp(&a.draw.timestamp));
    entries
}

/// Entries among the `window` most recent draws whose number was drawn more
/// than once inside that window, newest first.
pub fn repeat_winners(entries: &[HistoryEntry], window: usize) -> Vec<HistoryEntry> {
    let recent: Vec<HistoryEntry> = newest_first(entries.to_vec())
        .into_iter()
        .take(window)
        .collect();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for entry in &recent {
        *counts.entry(entry.draw.number).or_default() += 1;
    }

    recent
        .into_iter()
        .filter(|entry| counts[&entry.draw.number] > 1)
        .collect()
}

/// One display line, e.g. `#7 (from 1 to 10) at 19/10/2026 14:03:12`
pub fn describe(entry: &HistoryEntry) -> String {
    let when = DateTime::from_timestamp_millis(entry.draw.timestamp)
        .map(|at| at.with_timezone(&Local).format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| entry.draw.timestamp.to_string());

    format!(
        "#{} (from {} to {}) at {}",
        entry.draw.number, entry.draw.min, entry.draw.max, when
    )
}
