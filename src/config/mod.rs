use rust_decimal::Decimal;
use std::env;

const DEFAULT_LEADERBOARD_API: &str = "https://lb-api.polymarket.com";
const DEFAULT_GAMMA_API: &str = "https://gamma-api.polymarket.com";
const DEFAULT_RPC_URL: &str = "https://polygon-rpc.com";
// Polygon Conditional Tokens Framework (ERC-1155 outcome tokens).
const DEFAULT_CTF_ADDRESS: &str = "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    // External sources
    pub leaderboard_api_url: String,
    pub gamma_api_url: String,
    pub rpc_url: String,
    pub ctf_address: String,
    pub request_timeout_secs: u64,

    // Leaderboard pagination
    pub leaderboard_window: String,
    pub leaderboard_sort: String,
    pub page_size: u32,
    pub max_offset: u32,
    pub page_delay_ms: u64,

    // Market catalog
    pub market_fetch_limit: u32,

    // Reconciliation
    pub pnl_reconcile_threshold: Decimal,

    // Rarity scoring saturation ceilings
    pub pnl_ceiling: Decimal,
    pub volume_ceiling: Decimal,

    // Position verification
    pub multicall_group_size: usize,
    pub market_candidate_limit: i64,
    pub verify_top_n: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,

            leaderboard_api_url: env::var("LEADERBOARD_API_URL")
                .unwrap_or_else(|_| DEFAULT_LEADERBOARD_API.into()),
            gamma_api_url: env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| DEFAULT_GAMMA_API.into()),
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.into()),
            ctf_address: env::var("CTF_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_CTF_ADDRESS.into()),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30u64),

            leaderboard_window: env::var("LEADERBOARD_WINDOW").unwrap_or_else(|_| "30d".into()),
            leaderboard_sort: env::var("LEADERBOARD_SORT").unwrap_or_else(|_| "pnl".into()),
            page_size: parse_env("LEADERBOARD_PAGE_SIZE", 100u32),
            max_offset: parse_env("LEADERBOARD_MAX_OFFSET", 1_000u32),
            page_delay_ms: parse_env("LEADERBOARD_PAGE_DELAY_MS", 500u64),

            market_fetch_limit: parse_env("MARKET_FETCH_LIMIT", 500u32),

            pnl_reconcile_threshold: parse_env("PNL_RECONCILE_THRESHOLD", Decimal::ONE),

            pnl_ceiling: parse_env("RARITY_PNL_CEILING", Decimal::from(100_000)),
            volume_ceiling: parse_env("RARITY_VOLUME_CEILING", Decimal::from(1_000_000)),

            multicall_group_size: parse_env("MULTICALL_GROUP_SIZE", 5usize),
            market_candidate_limit: parse_env("MARKET_CANDIDATE_LIMIT", 100i64),
            verify_top_n: parse_env("VERIFY_TOP_N", 50i64),
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
