use crate::domain::model::{RollcallEvent, Roster, SeatingGrid};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// 持久化的 key-value 儲存（歷史紀錄只用一個固定 key）
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<Value>>> + Send;
    fn set(&self, key: &str, value: Value) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn fetch_roster(&self) -> Result<Roster>;
}

#[async_trait]
pub trait SeatingProvider: Send + Sync {
    async fn fetch_seating(&self) -> Result<SeatingGrid>;
}

/// 發送事件給宿主；不保證送達
pub trait EventSink: Send + Sync {
    fn emit(&self, channel: &str, event: &RollcallEvent) -> Result<()>;
}
