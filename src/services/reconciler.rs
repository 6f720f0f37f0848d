use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::db::trader_repo;
use crate::errors::PassSummary;
use crate::models::Trader;
use crate::polymarket::{normalize_handle, RankedTrader};

/// What happened to one stored trader during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReconcileAction {
    /// No source record matched the handle this pass; row left untouched.
    Unseen,
    /// Address and pnl both within tolerance; no write.
    Unchanged,
    /// Same address, pnl moved past the threshold; attributes refreshed.
    Refreshed,
    /// Address rewritten in place to the new source address.
    Migrated,
    /// Source address already had a row; newer attributes copied onto it and
    /// the stale row deleted.
    Merged,
}

/// Reconcile stored trader identity against the current source batch.
///
/// The wallet address the source reports for a logical trader can change
/// over time; the stable identity signal is the public handle. For every
/// stored trader with a handle, find the best current source record by
/// normalized handle and migrate or merge the stored row onto the source
/// address. A failure for one trader is logged and skipped; the pass
/// continues for all others.
pub async fn reconcile(
    pool: &PgPool,
    batch: &[RankedTrader],
    pnl_threshold: Decimal,
    summary: &mut PassSummary,
) {
    let by_handle = index_by_handle(batch);

    let stored = match trader_repo::get_traders_with_handle(pool).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "Reconciler: failed to load stored traders, skipping reconciliation");
            summary.failed += 1;
            return;
        }
    };

    for trader in &stored {
        match reconcile_one(pool, trader, &by_handle, pnl_threshold).await {
            Ok(ReconcileAction::Unseen) => summary.unseen += 1,
            Ok(ReconcileAction::Merged) => summary.merged += 1,
            Ok(ReconcileAction::Migrated) => summary.migrated += 1,
            Ok(ReconcileAction::Unchanged) | Ok(ReconcileAction::Refreshed) => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    address = %trader.address,
                    handle = ?trader.twitter_username,
                    "Reconciliation failed for trader, skipping"
                );
                summary.failed += 1;
            }
        }
    }
}

async fn reconcile_one(
    pool: &PgPool,
    stored: &Trader,
    by_handle: &HashMap<String, &RankedTrader>,
    pnl_threshold: Decimal,
) -> anyhow::Result<ReconcileAction> {
    let handle = match stored.twitter_username.as_deref().and_then(normalize_handle) {
        Some(h) => h,
        None => return Ok(ReconcileAction::Unchanged),
    };

    let Some(source) = by_handle.get(&handle) else {
        return Ok(ReconcileAction::Unseen);
    };

    let address_changed = source.address != stored.address;
    let pnl_moved = (source.pnl - stored.realized_pnl).abs() > pnl_threshold;

    if !address_changed && !pnl_moved {
        return Ok(ReconcileAction::Unchanged);
    }

    if !address_changed {
        trader_repo::refresh_from_source(pool, &stored.address, source).await?;
        return Ok(ReconcileAction::Refreshed);
    }

    if trader_repo::get_trader_by_address(pool, &source.address)
        .await?
        .is_some()
    {
        // Conflict: the source address already has a row. Copy the newer
        // attributes onto it, then delete the stale row so exactly one row
        // remains for this handle.
        trader_repo::refresh_from_source(pool, &source.address, source).await?;
        trader_repo::delete_trader(pool, &stored.address).await?;
        tracing::info!(
            handle = %handle,
            old_address = %stored.address,
            new_address = %source.address,
            "Merged trader identity onto existing row"
        );
        Ok(ReconcileAction::Merged)
    } else {
        trader_repo::update_address(pool, &stored.address, &source.address).await?;
        trader_repo::refresh_from_source(pool, &source.address, source).await?;
        tracing::info!(
            handle = %handle,
            old_address = %stored.address,
            new_address = %source.address,
            "Migrated trader to new address"
        );
        Ok(ReconcileAction::Migrated)
    }
}

/// Index the source batch by normalized handle, keeping the highest-pnl
/// record when a handle appears more than once.
fn index_by_handle(batch: &[RankedTrader]) -> HashMap<String, &RankedTrader> {
    let mut map: HashMap<String, &RankedTrader> = HashMap::new();
    for rec in batch {
        let Some(handle) = rec.handle.as_deref() else {
            continue;
        };
        match map.get(handle) {
            Some(existing) if existing.pnl >= rec.pnl => {}
            _ => {
                map.insert(handle.to_string(), rec);
            }
        }
    }
    map
}
