mod common;

use rust_decimal::Decimal;

use smartscan::db::trader_repo;
use smartscan::errors::PassSummary;
use smartscan::services::reconciler;

#[tokio::test]
async fn test_merge_leaves_exactly_one_row_per_handle() {
    let pool = common::setup_test_db().await;

    // Two stored rows: the stale one carries the handle, the target row
    // already exists at the address upstream now reports.
    common::seed_trader(&pool, "0xold_addr", Some("whale"), 100).await;
    common::seed_trader(&pool, "0xnew_addr", None, 0).await;

    let batch = vec![common::ranked("0xnew_addr", Some("whale"), 900)];
    let mut summary = PassSummary::default();
    reconciler::reconcile(&pool, &batch, Decimal::ONE, &mut summary).await;

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.failed, 0);

    // Old row deleted
    assert!(trader_repo::get_trader_by_address(&pool, "0xold_addr")
        .await
        .unwrap()
        .is_none());

    // Surviving row holds the newer attributes and the handle
    let survivor = trader_repo::get_trader_by_address(&pool, "0xnew_addr")
        .await
        .unwrap()
        .expect("merged row should exist");
    assert_eq!(survivor.twitter_username.as_deref(), Some("whale"));
    assert_eq!(survivor.realized_pnl, Decimal::from(900));

    // Exactly one row for the handle
    let with_handle = trader_repo::get_traders_with_handle(&pool).await.unwrap();
    let whale_rows: Vec<_> = with_handle
        .iter()
        .filter(|t| t.twitter_username.as_deref() == Some("whale"))
        .collect();
    assert_eq!(whale_rows.len(), 1);
}

#[tokio::test]
async fn test_migration_rewrites_address_in_place() {
    let pool = common::setup_test_db().await;

    common::seed_trader(&pool, "0xmigrate_old", Some("mover"), 50).await;

    // No stored row at the new address -> rewrite, not merge
    let batch = vec![common::ranked("0xmigrate_new", Some("mover"), 500)];
    let mut summary = PassSummary::default();
    reconciler::reconcile(&pool, &batch, Decimal::ONE, &mut summary).await;

    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.merged, 0);

    assert!(trader_repo::get_trader_by_address(&pool, "0xmigrate_old")
        .await
        .unwrap()
        .is_none());

    let moved = trader_repo::get_trader_by_address(&pool, "0xmigrate_new")
        .await
        .unwrap()
        .expect("migrated row should exist");
    assert_eq!(moved.twitter_username.as_deref(), Some("mover"));
    assert_eq!(moved.realized_pnl, Decimal::from(500));
}

#[tokio::test]
async fn test_unseen_trader_left_untouched() {
    let pool = common::setup_test_db().await;

    common::seed_trader(&pool, "0xdormant", Some("ghost"), 77).await;

    // Batch has no record for the handle
    let batch = vec![common::ranked("0xother", Some("someone_else"), 10)];
    let mut summary = PassSummary::default();
    reconciler::reconcile(&pool, &batch, Decimal::ONE, &mut summary).await;

    assert_eq!(summary.unseen, 1);
    assert_eq!(summary.merged + summary.migrated, 0);

    let dormant = trader_repo::get_trader_by_address(&pool, "0xdormant")
        .await
        .unwrap()
        .expect("unseen row must not be deleted");
    assert_eq!(dormant.realized_pnl, Decimal::from(77));
}

#[tokio::test]
async fn test_unchanged_within_threshold_is_noop() {
    let pool = common::setup_test_db().await;

    common::seed_trader(&pool, "0xstable", Some("steady"), 100).await;

    // Same address, pnl within the threshold -> no write at all
    let mut batch = vec![common::ranked("0xstable", Some("steady"), 100)];
    batch[0].pnl = Decimal::new(1005, 1); // 100.5, delta 0.5 <= 1
    let mut summary = PassSummary::default();
    reconciler::reconcile(&pool, &batch, Decimal::ONE, &mut summary).await;

    assert_eq!(summary.merged + summary.migrated + summary.unseen, 0);

    let stored = trader_repo::get_trader_by_address(&pool, "0xstable")
        .await
        .unwrap()
        .unwrap();
    // Untouched: the stored pnl did not pick up the drifted source value
    assert_eq!(stored.realized_pnl, Decimal::from(100));
}
