pub mod gamma_client;
pub mod leaderboard_client;
pub mod types;

pub use gamma_client::{GammaClient, GammaClientError, GammaMarket};
pub use leaderboard_client::{LeaderboardClient, LeaderboardClientError, PageSettings};
pub use types::{normalize_handle, LeaderboardEntry, RankedTrader};
