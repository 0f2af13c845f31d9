// src/services/redis_service.rs
use crate::errors::PotretError;
use crate::models::{HistoryItem, ImageUpload};
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

/// Fixed storage name for the generation history record.
const HISTORY_KEY: &str = "potret:history";
/// The history list keeps the 50 most recent rounds.
pub const HISTORY_CAP: usize = 50;
/// Uploaded images expire after 24 hours.
const UPLOAD_TTL_SECS: usize = 86400;

/// Prepends the new item and enforces the newest-first, capped ordering.
pub fn push_capped(mut items: Vec<HistoryItem>, item: HistoryItem) -> Vec<HistoryItem> {
    items.insert(0, item);
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(HISTORY_CAP);
    items
}

/// Persistence seam for history records, mocked in orchestrator tests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record(&self, item: HistoryItem) -> Result<(), PotretError>;
    async fn list(&self) -> Result<Vec<HistoryItem>, PotretError>;
    async fn delete(&self, id: &str) -> Result<(), PotretError>;
    async fn clear(&self) -> Result<(), PotretError>;
}

pub struct RedisService {
    client: Client,
}

impl RedisService {
    pub async fn new(redis_url: &str) -> Result<Self, PotretError> {
        let client = Client::open(redis_url).map_err(|e| PotretError::Redis(e.to_string()))?;

        // Test connection
        let mut conn = client
            .get_async_connection()
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))?;

        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::Connection, PotretError> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))
    }

    pub async fn store_image(&self, image: &ImageUpload) -> Result<(), PotretError> {
        let mut conn = self.connection().await?;

        let key = format!("image:{}", image.id);
        let value =
            serde_json::to_string(image).map_err(|e| PotretError::Serialization(e.to_string()))?;

        conn.set_ex::<_, _, ()>(&key, value, UPLOAD_TTL_SECS)
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))?;

        Ok(())
    }

    pub async fn get_image(&self, image_id: &Uuid) -> Result<ImageUpload, PotretError> {
        let mut conn = self.connection().await?;

        let key = format!("image:{}", image_id);
        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))?;

        let value = value
            .ok_or_else(|| PotretError::NotFound(format!("Image {} not found", image_id)))?;

        serde_json::from_str(&value).map_err(|e| PotretError::Serialization(e.to_string()))
    }

    async fn load_history(&self) -> Result<Vec<HistoryItem>, PotretError> {
        let mut conn = self.connection().await?;

        let value: Option<String> = conn
            .get(HISTORY_KEY)
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))?;

        match value {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| PotretError::Serialization(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save_history(&self, items: &[HistoryItem]) -> Result<(), PotretError> {
        let mut conn = self.connection().await?;

        let value =
            serde_json::to_string(items).map_err(|e| PotretError::Serialization(e.to_string()))?;

        conn.set::<_, _, ()>(HISTORY_KEY, value)
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))
    }
}

#[async_trait]
impl HistoryStore for RedisService {
    async fn record(&self, item: HistoryItem) -> Result<(), PotretError> {
        let items = self.load_history().await?;
        self.save_history(&push_capped(items, item)).await
    }

    async fn list(&self) -> Result<Vec<HistoryItem>, PotretError> {
        self.load_history().await
    }

    async fn delete(&self, id: &str) -> Result<(), PotretError> {
        let mut items = self.load_history().await?;
        items.retain(|item| item.id != id);
        self.save_history(&items).await
    }

    async fn clear(&self) -> Result<(), PotretError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(HISTORY_KEY)
            .await
            .map_err(|e| PotretError::Redis(e.to_string()))
    }
}
