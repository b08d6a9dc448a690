use crate::core::history::RETENTION_MS;
use crate::domain::model::{HistoryEntry, PickStats};

/// 某人的近期抽中統計。`probability` 是觀察到的比例，不是預測值。
pub fn stats_for(entries: &[HistoryEntry], name: &str, now: i64) -> PickStats {
    let mut mine: Vec<i64> = entries
        .iter()
        .filter(|entry| entry.name == name)
        .map(|entry| entry.timestamp)
        .collect();
    mine.sort_unstable_by(|a, b| b.cmp(a));
    mine.truncate(3);

    let window_start = now - RETENTION_MS;
    let in_window = |entry: &&HistoryEntry| (window_start..=now).contains(&entry.timestamp);

    let recent_total = entries.iter().filter(in_window).count();
    let recent_count = entries
        .iter()
        .filter(in_window)
        .filter(|entry| entry.name == name)
        .count();
    let probability = if recent_total > 0 {
        recent_count as f64 / recent_total as f64
    } else {
        0.0
    };

    PickStats {
        last3: mine,
        recent_count,
        recent_total,
        probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60 * 1000;
    const NOW: i64 = 1_760_000_000_000;

    #[test]
    fn test_stats_example() {
        let entries = vec![
            HistoryEntry::new("A", NOW - DAY),
            HistoryEntry::new("B", NOW - 2 * DAY),
            HistoryEntry::new("A", NOW - 10 * DAY),
        ];
        let stats = stats_for(&entries, "A", NOW);
        assert_eq!(stats.recent_total, 2);
        assert_eq!(stats.recent_count, 1);
        assert_eq!(stats.probability, 0.5);
        assert_eq!(stats.last3, vec![NOW - DAY, NOW - 10 * DAY]);
    }

    #[test]
    fn test_no_history_has_zero_probability() {
        let stats = stats_for(&[], "A", NOW);
        assert_eq!(stats, PickStats::default());

        let stale = vec![HistoryEntry::new("A", NOW - 30 * DAY)];
        let stats = stats_for(&stale, "A", NOW);
        assert_eq!(stats.recent_total, 0);
        assert_eq!(stats.probability, 0.0);
        assert_eq!(stats.last3, vec![NOW - 30 * DAY]);
    }

    #[test]
    fn test_last3_keeps_three_newest() {
        let entries: Vec<HistoryEntry> = (1..=5).map(|i| HistoryEntry::new("A", NOW - i * 1000)).collect();
        let stats = stats_for(&entries, "A", NOW);
        assert_eq!(stats.last3, vec![NOW - 1000, NOW - 2000, NOW - 3000]);
        assert_eq!(stats.probability, 1.0);
    }

    #[test]
    fn test_probability_is_bounded() {
        let entries = vec![
            HistoryEntry::new("A", NOW),
            HistoryEntry::new("B", NOW - 1),
            HistoryEntry::new("C", NOW - 5 * DAY),
            HistoryEntry::new("A", NOW + DAY),
        ];
        for name in ["A", "B", "C", "Z"] {
            let stats = stats_for(&entries, name, NOW);
            assert!((0.0..=1.0).contains(&stats.probability));
            assert_eq!(stats.recent_total, 3);
        }
        assert_eq!(stats_for(&entries, "Z", NOW).probability, 0.0);
    }
}
