use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{state_repo, trader_repo};
use crate::errors::{PassError, PassSummary, RecordOutcome};
use crate::intelligence::{classify, rarity_score, RarityInputs, ScoreSettings};
use crate::models::NewTrader;
use crate::polymarket::{LeaderboardClient, LeaderboardEntry, PageSettings, RankedTrader};
use crate::services::reconciler;

const SOURCE: &str = "leaderboard";

/// One full leaderboard ingestion pass: fetch pages, reconcile stored
/// identities against the batch, classify and score the ranked batch, upsert
/// traders, then advance the watermark. Safe to re-run: identical upstream
/// data converges to identical rows (only last_active_at moves).
pub async fn run(
    client: &LeaderboardClient,
    pool: &PgPool,
    config: &AppConfig,
) -> Result<PassSummary, PassError> {
    let started_at = Utc::now();

    let pages = PageSettings {
        page_size: config.page_size,
        max_offset: config.max_offset,
        page_delay_ms: config.page_delay_ms,
    };

    let entries = client
        .fetch_all(&config.leaderboard_window, &config.leaderboard_sort, pages)
        .await
        .map_err(|e| PassError::SourceUnavailable(e.to_string()))?;

    tracing::info!(
        count = entries.len(),
        window = %config.leaderboard_window,
        "Leaderboard fetched"
    );

    let (batch, skipped) = normalize_batch(entries);
    let mut summary = apply_batch(pool, &batch, config).await;
    summary.skipped += skipped;

    state_repo::set_watermark(pool, SOURCE, &config.leaderboard_window, started_at).await?;

    tracing::info!(%summary, "Leaderboard pass complete");
    Ok(summary)
}

/// Reconcile and upsert an already-fetched batch. Split out from [`run`] so
/// the pipeline below the HTTP boundary is directly testable.
pub async fn apply_batch(
    pool: &PgPool,
    batch: &[RankedTrader],
    config: &AppConfig,
) -> PassSummary {
    let mut summary = PassSummary::default();

    reconciler::reconcile(pool, batch, config.pnl_reconcile_threshold, &mut summary).await;

    let total = batch.len();
    let settings = ScoreSettings {
        pnl_ceiling: config.pnl_ceiling,
        volume_ceiling: config.volume_ceiling,
    };

    for (rank_index, rec) in batch.iter().enumerate() {
        let outcome = upsert_ranked(pool, rec, rank_index, total, &settings).await;
        summary.record(outcome);
    }

    summary
}

async fn upsert_ranked(
    pool: &PgPool,
    rec: &RankedTrader,
    rank_index: usize,
    total: usize,
    settings: &ScoreSettings,
) -> RecordOutcome {
    let has_identity = rec.handle.is_some();
    let tier = classify(rank_index, total, has_identity);
    let rarity = rarity_score(
        &RarityInputs {
            pnl: rec.pnl,
            volume: rec.volume,
            markets_traded: rec.markets_traded,
            rank: rank_index + 1,
            has_public_identity: has_identity,
        },
        settings,
    );

    let existing = match trader_repo::get_trader_by_address(pool, &rec.address).await {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(error = %e, address = %rec.address, "Trader lookup failed, skipping record");
            return RecordOutcome::Failed;
        }
    };

    let new_trader = NewTrader {
        address: rec.address.clone(),
        display_name: rec.display_name.clone(),
        profile_picture: rec.profile_picture.clone(),
        twitter_username: rec.handle.clone(),
        tier: tier.as_str().to_string(),
        realized_pnl: rec.pnl,
        total_pnl: rec.pnl,
        volume: rec.volume,
        trade_count: rec.markets_traded,
        rarity_score: rarity,
        rank: (rank_index + 1) as i32,
    };

    match trader_repo::upsert_trader(pool, &new_trader).await {
        Ok(_) => {
            if existing.is_some() {
                RecordOutcome::Updated
            } else {
                RecordOutcome::Created
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, address = %rec.address, "Trader upsert failed, skipping record");
            RecordOutcome::Failed
        }
    }
}

/// Normalize raw entries into the ranked batch: drop wallet-less records,
/// enforce pnl-descending order, and de-duplicate addresses and handles
/// within the batch (first occurrence wins; a duplicated handle is treated
/// as absent on later entries so one pass never creates two rows for one
/// handle). Returns the batch and the number of records dropped, which the
/// pass counts as skipped.
pub fn normalize_batch(entries: Vec<LeaderboardEntry>) -> (Vec<RankedTrader>, u32) {
    let raw_count = entries.len();

    let mut batch: Vec<RankedTrader> = entries.iter().filter_map(|e| e.normalize()).collect();
    batch.sort_by(|a, b| b.pnl.cmp(&a.pnl));

    let mut seen_addresses: HashSet<String> = HashSet::new();
    let mut seen_handles: HashSet<String> = HashSet::new();

    batch.retain(|rec| seen_addresses.insert(rec.address.clone()));
    for rec in &mut batch {
        if let Some(h) = rec.handle.clone() {
            if !seen_handles.insert(h) {
                rec.handle = None;
            }
        }
    }

    let skipped = (raw_count - batch.len()) as u32;
    (batch, skipped)
}
