use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-(source, key) watermark: the start time of the last fully successful
/// ingestion pass. Written once per pass, never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IngestionState {
    pub id: Uuid,
    pub source: String,
    pub key: String,
    pub last_timestamp: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
