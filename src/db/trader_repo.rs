use sqlx::PgPool;

use crate::models::{NewTrader, Trader};
use crate::polymarket::RankedTrader;

/// Create-or-update a trader by canonical address. Scoring fields are owned
/// by the pipeline and overwritten; win_rate and geo fields are preserved.
pub async fn upsert_trader(pool: &PgPool, trader: &NewTrader) -> anyhow::Result<Trader> {
    let row = sqlx::query_as::<_, Trader>(
        r#"
        INSERT INTO traders (
            address, display_name, profile_picture, twitter_username, tier,
            realized_pnl, total_pnl, volume, trade_count, rarity_score, rank,
            last_active_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
        ON CONFLICT (address) DO UPDATE SET
            display_name = EXCLUDED.display_name,
            profile_picture = COALESCE(EXCLUDED.profile_picture, traders.profile_picture),
            twitter_username = COALESCE(EXCLUDED.twitter_username, traders.twitter_username),
            tier = EXCLUDED.tier,
            realized_pnl = EXCLUDED.realized_pnl,
            total_pnl = EXCLUDED.total_pnl,
            volume = EXCLUDED.volume,
            trade_count = EXCLUDED.trade_count,
            rarity_score = EXCLUDED.rarity_score,
            rank = EXCLUDED.rank,
            last_active_at = NOW(),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&trader.address)
    .bind(&trader.display_name)
    .bind(&trader.profile_picture)
    .bind(&trader.twitter_username)
    .bind(&trader.tier)
    .bind(trader.realized_pnl)
    .bind(trader.total_pnl)
    .bind(trader.volume)
    .bind(trader.trade_count)
    .bind(trader.rarity_score)
    .bind(trader.rank)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_trader_by_address(
    pool: &PgPool,
    address: &str,
) -> anyhow::Result<Option<Trader>> {
    let trader = sqlx::query_as::<_, Trader>("SELECT * FROM traders WHERE address = $1")
        .bind(address)
        .fetch_optional(pool)
        .await?;

    Ok(trader)
}

/// All stored traders carrying a public handle, the reconciler's working set.
pub async fn get_traders_with_handle(pool: &PgPool) -> anyhow::Result<Vec<Trader>> {
    let traders = sqlx::query_as::<_, Trader>(
        "SELECT * FROM traders WHERE twitter_username IS NOT NULL ORDER BY address",
    )
    .fetch_all(pool)
    .await?;

    Ok(traders)
}

/// Refresh source-owned attributes on the row at `address` from the current
/// upstream record. Tier and rarity are recomputed later in the same pass.
pub async fn refresh_from_source(
    pool: &PgPool,
    address: &str,
    source: &RankedTrader,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE traders
        SET display_name = $2,
            profile_picture = COALESCE($3, profile_picture),
            twitter_username = COALESCE($4, twitter_username),
            realized_pnl = $5,
            total_pnl = $6,
            volume = $7,
            trade_count = $8,
            updated_at = NOW()
        WHERE address = $1
        "#,
    )
    .bind(address)
    .bind(&source.display_name)
    .bind(&source.profile_picture)
    .bind(&source.handle)
    .bind(source.pnl)
    .bind(source.pnl)
    .bind(source.volume)
    .bind(source.markets_traded)
    .execute(pool)
    .await?;

    Ok(())
}

/// Rewrite a trader's canonical address in place (identity migration with no
/// conflicting row at the new address).
pub async fn update_address(pool: &PgPool, old: &str, new: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE traders SET address = $2, updated_at = NOW() WHERE address = $1")
        .bind(old)
        .bind(new)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete_trader(pool: &PgPool, address: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM traders WHERE address = $1")
        .bind(address)
        .execute(pool)
        .await?;

    Ok(())
}

/// Top traders in the given tiers by rarity, the verification candidate set.
pub async fn get_top_tier_traders(
    pool: &PgPool,
    tiers: &[String],
    limit: i64,
) -> anyhow::Result<Vec<Trader>> {
    let traders = sqlx::query_as::<_, Trader>(
        r#"
        SELECT * FROM traders
        WHERE tier = ANY($1)
        ORDER BY rarity_score DESC
        LIMIT $2
        "#,
    )
    .bind(tiers)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(traders)
}
