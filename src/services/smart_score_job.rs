use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;

use crate::chain::{CandidateMarket, PositionVerifier};
use crate::config::AppConfig;
use crate::db::{market_repo, state_repo, stats_repo, trader_repo};
use crate::errors::{PassError, PassSummary, RecordOutcome};
use crate::intelligence::{compute_market_stats, rank_markets, MarketHolder};
use crate::models::{Tier, Trader};

const SOURCE: &str = "smart_stats";

/// One smart-score pass: verify on-chain holdings of top-tier traders across
/// the highest-volume open markets, aggregate per-market stats, and append
/// ranked snapshots. Markets with no verified holder are dropped from the
/// published ranking.
pub async fn run(
    verifier: &PositionVerifier,
    pool: &PgPool,
    config: &AppConfig,
) -> Result<PassSummary, PassError> {
    let started_at = Utc::now();
    let mut summary = PassSummary::default();

    let markets = market_repo::get_open_markets_by_volume(pool, config.market_candidate_limit).await?;
    let traders = trader_repo::get_top_tier_traders(
        pool,
        &["S".to_string(), "A".to_string()],
        config.verify_top_n,
    )
    .await?;

    let candidates: Vec<CandidateMarket> = markets
        .iter()
        .filter(|m| !m.outcome_token_ids.0.is_empty())
        .map(|m| CandidateMarket {
            market_id: m.id.clone(),
            token_ids: m.outcome_token_ids.0.clone(),
        })
        .collect();

    if candidates.is_empty() || traders.is_empty() {
        tracing::info!(
            markets = candidates.len(),
            traders = traders.len(),
            "Nothing to verify this pass"
        );
        state_repo::set_watermark(pool, SOURCE, "all", started_at).await?;
        return Ok(summary);
    }

    let addresses: Vec<String> = traders.iter().map(|t| t.address.clone()).collect();
    let holders_by_market = verifier.verify_holdings(&candidates, &addresses).await;

    let by_address: HashMap<&str, &Trader> =
        traders.iter().map(|t| (t.address.as_str(), t)).collect();

    let computed_at = Utc::now();
    let mut scored = Vec::new();

    for market in &markets {
        let Some(holder_set) = holders_by_market.get(&market.id) else {
            continue;
        };

        let holders: Vec<MarketHolder> = holder_set
            .iter()
            .filter_map(|addr| by_address.get(addr.as_str()))
            .map(|t| MarketHolder {
                address: t.address.clone(),
                display_name: t.display_name.clone(),
                tier: Tier::parse(&t.tier).unwrap_or(Tier::E),
                rarity_score: t.rarity_score,
            })
            .collect();

        if let Some(stats) = compute_market_stats(&market.id, market.volume, &holders, computed_at)
        {
            scored.push(stats);
        }
    }

    let ranked = rank_markets(scored);

    for stats in &ranked {
        match stats_repo::insert_snapshot(pool, stats).await {
            Ok(()) => summary.record(RecordOutcome::Created),
            Err(e) => {
                tracing::warn!(error = %e, market_id = %stats.market_id, "Snapshot insert failed, skipping");
                summary.record(RecordOutcome::Failed);
            }
        }
    }

    state_repo::set_watermark(pool, SOURCE, "all", started_at).await?;

    tracing::info!(
        candidates = candidates.len(),
        traders = addresses.len(),
        ranked = ranked.len(),
        %summary,
        "Smart score pass complete"
    );

    Ok(summary)
}
