use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Leaderboard (lb-api)
// ---------------------------------------------------------------------------

/// Raw ranked trader record from the leaderboard endpoint. Every field is
/// optional at the wire level; the sync pass normalizes and defaults them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeaderboardEntry {
    #[serde(default, alias = "proxyWallet", alias = "walletAddress")]
    pub wallet: Option<String>,
    #[serde(default, alias = "name", alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default, alias = "profileImage", alias = "profilePicture")]
    pub profile_image: Option<String>,
    #[serde(default, alias = "xUsername", alias = "twitterUsername")]
    pub twitter_username: Option<String>,
    #[serde(default, alias = "amount", alias = "pnl")]
    pub pnl: Option<Decimal>,
    #[serde(default, alias = "vol", alias = "volume")]
    pub volume: Option<Decimal>,
    #[serde(default, alias = "marketsTraded", alias = "traded")]
    pub markets_traded: Option<i32>,
}

/// A leaderboard entry after normalization: canonical lower-cased address,
/// stripped handle, defaulted numbers. Ordered by source rank.
#[derive(Debug, Clone)]
pub struct RankedTrader {
    pub address: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    /// Normalized handle: no leading '@', trimmed, lower-cased.
    pub handle: Option<String>,
    pub pnl: Decimal,
    pub volume: Decimal,
    pub markets_traded: i32,
}

/// Strip any leading '@', trim, and lower-case a public handle. Returns None
/// for handles that are empty after normalization.
pub fn normalize_handle(raw: &str) -> Option<String> {
    let h = raw.trim().trim_start_matches('@').trim().to_lowercase();
    if h.is_empty() {
        None
    } else {
        Some(h)
    }
}

impl LeaderboardEntry {
    /// Normalize into a RankedTrader. Entries without a wallet address are
    /// dropped (None).
    pub fn normalize(&self) -> Option<RankedTrader> {
        let address = match &self.wallet {
            Some(a) if !a.trim().is_empty() => a.trim().to_lowercase(),
            _ => return None,
        };

        Some(RankedTrader {
            address,
            display_name: self.display_name.clone().unwrap_or_default(),
            profile_picture: self.profile_image.clone(),
            handle: self
                .twitter_username
                .as_deref()
                .and_then(normalize_handle),
            pnl: self.pnl.unwrap_or(Decimal::ZERO),
            volume: self.volume.unwrap_or(Decimal::ZERO),
            markets_traded: self.markets_traded.unwrap_or(0),
        })
    }
}
