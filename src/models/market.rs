use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    Open,
    Closed,
}

impl MarketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Open => "OPEN",
            MarketStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database row for the markets table, keyed by the external condition id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Market {
    pub id: String,
    pub question: String,
    pub category: String,
    pub event_slug: Option<String>,
    pub slug: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub liquidity: Decimal,
    pub volume: Decimal,
    pub status: String,
    pub outcome_token_ids: Json<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Normalized market record produced by the catalog fetch, ready to upsert.
#[derive(Debug, Clone)]
pub struct NewMarket {
    pub id: String,
    pub question: String,
    pub category: String,
    pub event_slug: Option<String>,
    pub slug: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub liquidity: Decimal,
    pub volume: Decimal,
    pub status: MarketStatus,
    pub outcome_token_ids: Vec<String>,
}
