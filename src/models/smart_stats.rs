use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Compact trader view embedded in a stats snapshot, ordered by rarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderSummary {
    pub address: String,
    pub display_name: String,
    pub tier: String,
    pub rarity_score: Decimal,
}

/// Append-only smart-money snapshot for one market. Readers take a recent
/// window and keep the newest row per market_id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketSmartStats {
    pub id: Uuid,
    pub market_id: String,
    pub computed_at: DateTime<Utc>,
    pub smart_count: i32,
    pub smart_weighted: Decimal,
    pub smart_score: Decimal,
    pub top_smart_traders: Json<Vec<TraderSummary>>,
    pub is_pinned: bool,
    pub priority: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSmartStats {
    pub market_id: String,
    pub computed_at: DateTime<Utc>,
    pub smart_count: i32,
    pub smart_weighted: Decimal,
    pub smart_score: Decimal,
    pub top_smart_traders: Vec<TraderSummary>,
}
