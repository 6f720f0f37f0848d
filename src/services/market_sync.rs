use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;

use crate::config::AppConfig;
use crate::db::{market_repo, state_repo};
use crate::errors::{PassError, PassSummary, RecordOutcome};
use crate::models::{MarketStatus, NewMarket};
use crate::polymarket::{GammaClient, GammaMarket};

const SOURCE: &str = "markets";

/// One market catalog pass: fetch open markets, upsert each, advance the
/// watermark. Per-record failures are logged and skipped.
pub async fn run(
    gamma: &GammaClient,
    pool: &PgPool,
    config: &AppConfig,
) -> Result<PassSummary, PassError> {
    let started_at = Utc::now();

    let markets = gamma
        .get_open_markets(config.market_fetch_limit)
        .await
        .map_err(|e| PassError::SourceUnavailable(e.to_string()))?;

    tracing::info!(count = markets.len(), "Market catalog fetched");

    let mut summary = PassSummary::default();
    for gm in &markets {
        summary.record(upsert_one(pool, gm).await);
    }

    state_repo::set_watermark(pool, SOURCE, "open", started_at).await?;

    tracing::info!(%summary, "Market catalog pass complete");
    Ok(summary)
}

async fn upsert_one(pool: &PgPool, gm: &GammaMarket) -> RecordOutcome {
    let market = to_new_market(gm);

    let existing = match market_repo::get_market(pool, &market.id).await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, market_id = %market.id, "Market lookup failed, skipping record");
            return RecordOutcome::Failed;
        }
    };

    match market_repo::upsert_market(pool, &market).await {
        Ok(_) => {
            if existing.is_some() {
                RecordOutcome::Updated
            } else {
                RecordOutcome::Created
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, market_id = %market.id, "Market upsert failed, skipping record");
            RecordOutcome::Failed
        }
    }
}

/// Normalize a raw catalog record, defaulting every optional field. Token
/// ids parse defensively to an empty list.
pub fn to_new_market(gm: &GammaMarket) -> NewMarket {
    NewMarket {
        id: gm.condition_id.clone(),
        question: gm.question.clone(),
        category: gm.category.clone().unwrap_or_default(),
        event_slug: gm.event_slug().map(str::to_string),
        slug: gm.slug.clone(),
        end_date: parse_end_date(gm.end_date_iso.as_deref()),
        liquidity: parse_decimal(gm.liquidity.as_deref()),
        volume: parse_decimal(gm.volume.as_deref()),
        status: if gm.closed.unwrap_or(false) {
            MarketStatus::Closed
        } else {
            MarketStatus::Open
        },
        outcome_token_ids: gm.parse_token_ids(),
    }
}

fn parse_decimal(raw: Option<&str>) -> Decimal {
    raw.and_then(|v| Decimal::from_str(v).ok())
        .unwrap_or(Decimal::ZERO)
}

fn parse_end_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polymarket::gamma_client::GammaEvent;

    #[test]
    fn test_to_new_market_defaults() {
        let gm = GammaMarket {
            condition_id: "0xcond".into(),
            question: "Will it rain?".into(),
            category: None,
            slug: None,
            events: vec![],
            clob_token_ids: Some("garbage".into()),
            volume: Some("not-a-number".into()),
            liquidity: None,
            end_date_iso: Some("2026-12-31T00:00:00Z".into()),
            closed: None,
        };
        let m = to_new_market(&gm);
        assert_eq!(m.category, "");
        assert_eq!(m.volume, Decimal::ZERO);
        assert_eq!(m.liquidity, Decimal::ZERO);
        assert!(m.outcome_token_ids.is_empty());
        assert_eq!(m.status, MarketStatus::Open);
        assert!(m.end_date.is_some());
    }

    #[test]
    fn test_to_new_market_closed_flag() {
        let gm = GammaMarket {
            condition_id: "0xcond".into(),
            question: "q".into(),
            category: Some("Politics".into()),
            slug: Some("m-slug".into()),
            events: vec![GammaEvent {
                slug: Some("e-slug".into()),
            }],
            clob_token_ids: Some(r#"["1","2"]"#.into()),
            volume: Some("1234.5".into()),
            liquidity: Some("99".into()),
            end_date_iso: None,
            closed: Some(true),
        };
        let m = to_new_market(&gm);
        assert_eq!(m.status, MarketStatus::Closed);
        assert_eq!(m.event_slug.as_deref(), Some("e-slug"));
        assert_eq!(m.outcome_token_ids, vec!["1", "2"]);
        assert_eq!(m.volume, Decimal::from_str("1234.5").unwrap());
    }
}
