//! Watchlist comparison between the start and the end of a game.

use crate::game::types::{WatchEntry, WatchlistSnapshot};

/// Entries of `end` that changed since `start`: entries that are new are returned
/// whole, changed entries are returned with `progress` as the episode delta.
pub fn diff_watchlist(start: &WatchlistSnapshot, end: &WatchlistSnapshot) -> Vec<WatchEntry> {
    end.entries
        .iter()
        .filter_map(|end_entry| {
            match start.entries.iter().find(|s| s.media_id == end_entry.media_id) {
                None => Some(end_entry.clone()),
                Some(start_entry) if start_entry == end_entry => None,
                Some(start_entry) => Some(WatchEntry {
                    media_id: end_entry.media_id,
                    status: end_entry.status.clone(),
                    progress: end_entry.progress - start_entry.progress,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(media_id: u64, status: &str, progress: i64) -> WatchEntry {
        WatchEntry { media_id, status: status.to_string(), progress }
    }

    #[test]
    fn test_diff_reports_new_and_changed_entries() {
        let start = WatchlistSnapshot {
            entries: vec![entry(1, "CURRENT", 3), entry(2, "CURRENT", 5)],
            least_watched_genre: None,
        };
        let end = WatchlistSnapshot {
            entries: vec![entry(1, "COMPLETED", 12), entry(2, "CURRENT", 5), entry(3, "CURRENT", 2)],
            least_watched_genre: None,
        };
        assert_eq!(
            diff_watchlist(&start, &end),
            vec![entry(1, "COMPLETED", 9), entry(3, "CURRENT", 2)]
        );
    }
}
