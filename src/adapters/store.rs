use crate::domain::ports::KeyValueStore;
use crate::utils::error::{RollcallError, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// 以單一 JSON 物件檔案保存的 key-value 儲存
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(RollcallError::store(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut values = self.read_all().await?;
        Ok(values.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        // 檔案壞掉時整份重寫，不讓一次讀取失敗擋住之後的寫入
        let mut values = self.read_all().await.unwrap_or_else(|e| {
            tracing::warn!("⚠️ Rewriting unreadable store {}: {}", self.path.display(), e);
            Map::new()
        });
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(&Value::Object(values))?;
        tokio::fs::write(&self.path, data).await?;
        tracing::debug!("Saved '{}' to {}", key, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("history").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/store.json"));

        store.set("theme", json!("dark")).await.unwrap();
        store.set("history", json!([{"name": "Amy", "timestamp": 1}])).await.unwrap();

        assert_eq!(store.get("theme").await.unwrap(), Some(json!("dark")));
        assert_eq!(
            store.get("history").await.unwrap(),
            Some(json!([{"name": "Amy", "timestamp": 1}]))
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_errors_on_read_and_recovers_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(store.get("history").await.is_err());
        store.set("history", json!([])).await.unwrap();
        assert_eq!(store.get("history").await.unwrap(), Some(json!([])));
    }
}
