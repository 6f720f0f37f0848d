use std::time::Duration;

use smartscan::chain::{PositionVerifier, RpcClient};
use smartscan::config::AppConfig;
use smartscan::polymarket::{GammaClient, LeaderboardClient};
use smartscan::{db, services};

/// Job runner. An external scheduler dispatches named jobs and retries the
/// whole job on a non-zero exit; each pass is idempotent and safe to re-run.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let job = std::env::args().nth(1).unwrap_or_else(|| "run-once".into());

    tracing::info!(job = %job, "Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database ready");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let leaderboard = LeaderboardClient::new(http.clone(), config.leaderboard_api_url.clone());
    let gamma = GammaClient::new(http.clone(), config.gamma_api_url.clone());
    let verifier = PositionVerifier::new(
        RpcClient::new(http, config.rpc_url.clone()),
        &config.ctf_address,
        config.multicall_group_size,
    )?;

    match job.as_str() {
        "sync-leaderboard" => {
            services::leaderboard_sync::run(&leaderboard, &pool, &config).await?;
        }
        "sync-markets" => {
            services::market_sync::run(&gamma, &pool, &config).await?;
        }
        "score-markets" => {
            services::smart_score_job::run(&verifier, &pool, &config).await?;
        }
        "run-once" => {
            services::leaderboard_sync::run(&leaderboard, &pool, &config).await?;
            services::market_sync::run(&gamma, &pool, &config).await?;
            services::smart_score_job::run(&verifier, &pool, &config).await?;
        }
        other => {
            anyhow::bail!(
                "unknown job '{other}' (expected sync-leaderboard | sync-markets | score-markets | run-once)"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
