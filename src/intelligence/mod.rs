pub mod rarity;
pub mod smart_score;
pub mod tier;

pub use rarity::{rarity_score, RarityInputs, ScoreSettings};
pub use smart_score::{compute_market_stats, rank_markets, MarketHolder};
pub use tier::classify;
