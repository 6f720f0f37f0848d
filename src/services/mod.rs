pub mod leaderboard_sync;
pub mod market_sync;
pub mod reconciler;
pub mod smart_score_job;
