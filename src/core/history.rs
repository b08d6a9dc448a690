use crate::core::stats;
use crate::domain::model::{HistoryEntry, PickStats};
use crate::domain::ports::KeyValueStore;
use serde_json::Value;

/// 歷史紀錄在 key-value 儲存中的固定 key
pub const HISTORY_KEY: &str = "history";
/// 保留期間：5 天（毫秒）
pub const RETENTION_MS: i64 = 5 * 24 * 60 * 60 * 1000;

/// 抽選歷史：只增不改，每次寫入時清掉超過保留期間的紀錄
pub struct HistoryStore<K: KeyValueStore> {
    store: K,
    entries: Vec<HistoryEntry>,
}

impl<K: KeyValueStore> HistoryStore<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    /// 從外部儲存載入；讀取失敗或格式不對都從空紀錄開始
    pub async fn load(store: K) -> Self {
        let entries = match store.get(HISTORY_KEY).await {
            Ok(Some(value)) => decode_entries(value),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read pick history, starting empty: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} history entries", entries.len());
        Self { store, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// 新增一筆紀錄，清掉過期資料後寫回儲存。寫入失敗只記 log。
    pub async fn record(&mut self, name: &str, now: i64) {
        self.entries.push(HistoryEntry::new(name, now));

        let cutoff = now - RETENTION_MS;
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp >= cutoff);
        if self.entries.len() < before {
            tracing::debug!("Pruned {} expired history entries", before - self.entries.len());
        }

        let persisted = match serde_json::to_value(&self.entries) {
            Ok(value) => self.store.set(HISTORY_KEY, value).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = persisted {
            tracing::error!("❌ Failed to save pick history: {}", e);
        }
    }

    pub fn stats_for(&self, name: &str, now: i64) -> PickStats {
        stats::stats_for(&self.entries, name, now)
    }
}

/// 只接受陣列；陣列中壞掉的項目個別丟棄
fn decode_entries(value: Value) -> Vec<HistoryEntry> {
    let Value::Array(items) = value else {
        tracing::warn!("⚠️ Stored pick history is not a list, discarding it");
        return Vec::new();
    };

    let total = items.len();
    let entries: Vec<HistoryEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if entries.len() < total {
        tracing::warn!(
            "⚠️ Dropped {} malformed history entries",
            total - entries.len()
        );
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{RollcallError, Result};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const DAY: i64 = 24 * 60 * 60 * 1000;
    const NOW: i64 = 1_760_000_000_000;

    #[derive(Clone, Default)]
    struct MockStore {
        values: Arc<Mutex<HashMap<String, Value>>>,
        fail_writes: bool,
    }

    impl MockStore {
        fn with(key: &str, value: Value) -> Self {
            let store = Self::default();
            store
                .values
                .try_lock()
                .unwrap()
                .insert(key.to_string(), value);
            store
        }

        async fn value(&self, key: &str) -> Option<Value> {
            self.values.lock().await.get(key).cloned()
        }
    }

    impl KeyValueStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            Ok(self.values.lock().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value) -> Result<()> {
            if self.fail_writes {
                return Err(RollcallError::store("disk full"));
            }
            self.values.lock().await.insert(key.to_string(), value);
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(RollcallError::store("unavailable"))
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<()> {
            Err(RollcallError::store("unavailable"))
        }
    }

    #[tokio::test]
    async fn test_record_appends_and_persists() {
        let store = MockStore::default();
        let mut history = HistoryStore::load(store.clone()).await;
        assert!(history.entries().is_empty());

        history.record("Amy", NOW).await;
        history.record("Ben", NOW + 1).await;

        assert_eq!(
            history.entries(),
            &[HistoryEntry::new("Amy", NOW), HistoryEntry::new("Ben", NOW + 1)]
        );
        assert_eq!(
            store.value(HISTORY_KEY).await,
            Some(json!([
                {"name": "Amy", "timestamp": NOW},
                {"name": "Ben", "timestamp": NOW + 1}
            ]))
        );
    }

    #[tokio::test]
    async fn test_record_prunes_entries_outside_retention() {
        let store = MockStore::with(
            HISTORY_KEY,
            json!([
                {"name": "Old", "timestamp": NOW - 6 * DAY},
                {"name": "Edge", "timestamp": NOW - 5 * DAY},
                {"name": "Fresh", "timestamp": NOW - DAY}
            ]),
        );
        let mut history = HistoryStore::load(store.clone()).await;
        assert_eq!(history.entries().len(), 3);

        history.record("New", NOW).await;

        let names: Vec<&str> = history.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Edge", "Fresh", "New"]);
        assert!(history
            .entries()
            .iter()
            .all(|e| e.timestamp >= NOW - RETENTION_MS));
        let persisted = store.value(HISTORY_KEY).await.unwrap();
        assert_eq!(persisted.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_load_discards_malformed_values() {
        let history = HistoryStore::load(MockStore::with(HISTORY_KEY, json!({"a": 1}))).await;
        assert!(history.entries().is_empty());

        let history = HistoryStore::load(MockStore::with(
            HISTORY_KEY,
            json!([{"name": "Amy", "timestamp": NOW}, {"name": 3}, "junk"]),
        ))
        .await;
        assert_eq!(history.entries(), &[HistoryEntry::new("Amy", NOW)]);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_not_fatal() {
        let mut history = HistoryStore::load(BrokenStore).await;
        assert!(history.entries().is_empty());

        history.record("Amy", NOW).await;
        assert_eq!(history.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_state() {
        let store = MockStore {
            fail_writes: true,
            ..Default::default()
        };
        let mut history = HistoryStore::new(store.clone());
        history.record("Amy", NOW).await;
        history.record("Amy", NOW + 5).await;

        assert_eq!(history.entries().len(), 2);
        assert_eq!(store.value(HISTORY_KEY).await, None);
        assert_eq!(history.stats_for("Amy", NOW + 5).recent_count, 2);
    }
}
