use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::{Market, NewMarket};

/// Create-or-update a market by its external id.
pub async fn upsert_market(pool: &PgPool, market: &NewMarket) -> anyhow::Result<Market> {
    let row = sqlx::query_as::<_, Market>(
        r#"
        INSERT INTO markets (
            id, question, category, event_slug, slug, end_date,
            liquidity, volume, status, outcome_token_ids
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            question = EXCLUDED.question,
            category = EXCLUDED.category,
            event_slug = COALESCE(EXCLUDED.event_slug, markets.event_slug),
            slug = COALESCE(EXCLUDED.slug, markets.slug),
            end_date = EXCLUDED.end_date,
            liquidity = EXCLUDED.liquidity,
            volume = EXCLUDED.volume,
            status = EXCLUDED.status,
            outcome_token_ids = EXCLUDED.outcome_token_ids,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&market.id)
    .bind(&market.question)
    .bind(&market.category)
    .bind(&market.event_slug)
    .bind(&market.slug)
    .bind(market.end_date)
    .bind(market.liquidity)
    .bind(market.volume)
    .bind(market.status.as_str())
    .bind(Json(&market.outcome_token_ids))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_market(pool: &PgPool, id: &str) -> anyhow::Result<Option<Market>> {
    let market = sqlx::query_as::<_, Market>("SELECT * FROM markets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(market)
}

/// Open markets ordered by volume, the smart-score candidate set.
pub async fn get_open_markets_by_volume(
    pool: &PgPool,
    limit: i64,
) -> anyhow::Result<Vec<Market>> {
    let markets = sqlx::query_as::<_, Market>(
        r#"
        SELECT * FROM markets
        WHERE status = 'OPEN'
        ORDER BY volume DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(markets)
}
