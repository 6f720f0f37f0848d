use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::{MarketSmartStats, NewSmartStats};

/// Append one snapshot row. Snapshots are never updated or deleted;
/// freshness is a read-side concern.
pub async fn insert_snapshot(pool: &PgPool, stats: &NewSmartStats) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO market_smart_stats (
            market_id, computed_at, smart_count, smart_weighted, smart_score,
            top_smart_traders
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&stats.market_id)
    .bind(stats.computed_at)
    .bind(stats.smart_count)
    .bind(stats.smart_weighted)
    .bind(stats.smart_score)
    .bind(Json(&stats.top_smart_traders))
    .execute(pool)
    .await?;

    Ok(())
}

/// The published ranking view: newest snapshot per market within the window,
/// ordered by smart_score desc with the documented tie-breaks.
pub async fn latest_stats_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<MarketSmartStats>> {
    let rows = sqlx::query_as::<_, MarketSmartStats>(
        r#"
        SELECT * FROM (
            SELECT DISTINCT ON (market_id) *
            FROM market_smart_stats
            WHERE computed_at >= $1
            ORDER BY market_id, computed_at DESC
        ) latest
        ORDER BY smart_score DESC, smart_count DESC, smart_weighted DESC
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
