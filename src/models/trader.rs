use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database row for the traders table. One row per canonical (lower-cased)
/// wallet address; the reconciler additionally keeps at most one row per
/// non-null twitter handle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trader {
    pub address: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    pub twitter_username: Option<String>,
    pub tier: String,
    pub realized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub volume: Decimal,
    pub trade_count: i32,
    pub win_rate: Decimal,
    pub rarity_score: Decimal,
    pub rank: Option<i32>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub country: Option<String>,
    pub last_active_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fully classified and scored trader record, ready to upsert at the end of
/// a leaderboard pass. Fields the pipeline does not own (win_rate, geo) are
/// preserved on conflict.
#[derive(Debug, Clone)]
pub struct NewTrader {
    pub address: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    pub twitter_username: Option<String>,
    pub tier: String,
    pub realized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub volume: Decimal,
    pub trade_count: i32,
    pub rarity_score: Decimal,
    pub rank: i32,
}
