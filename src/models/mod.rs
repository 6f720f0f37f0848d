pub mod ingestion_state;
pub mod market;
pub mod smart_stats;
pub mod trader;

pub use ingestion_state::IngestionState;
pub use market::{Market, MarketStatus, NewMarket};
pub use smart_stats::{MarketSmartStats, NewSmartStats, TraderSummary};
pub use trader::{NewTrader, Trader};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Discrete trader classification, S highest through E lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    E,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
            Tier::E => "E",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "S" => Some(Tier::S),
            "A" => Some(Tier::A),
            "B" => Some(Tier::B),
            "C" => Some(Tier::C),
            "D" => Some(Tier::D),
            "E" => Some(Tier::E),
            _ => None,
        }
    }

    /// Weight used by the market smart scorer.
    pub fn weight(&self) -> Decimal {
        match self {
            Tier::S => Decimal::from(5),
            Tier::A => Decimal::from(3),
            Tier::B => Decimal::from(2),
            Tier::C => Decimal::ONE,
            Tier::D | Tier::E => Decimal::ZERO,
        }
    }

    /// Numeric rank for ordering: 0 = S (highest).
    pub fn ordinal(&self) -> u8 {
        match self {
            Tier::S => 0,
            Tier::A => 1,
            Tier::B => 2,
            Tier::C => 3,
            Tier::D => 4,
            Tier::E => 5,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
