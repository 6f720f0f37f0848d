use rust_decimal::Decimal;

// Per-component point budgets. Each term is clamped to its own maximum
// before summation, so no component can overflow into another's budget and
// the total stays in [0, 1000].
const MAX_PNL_POINTS: i64 = 400;
const MAX_VOLUME_POINTS: i64 = 250;
const MAX_MARKETS_POINTS: i64 = 150;
const POINTS_PER_MARKET: i64 = 3;
const MAX_RANK_POINTS: i64 = 100;
const IDENTITY_BONUS: i64 = 100;
const MAX_SCORE: i64 = 1_000;

/// Saturation ceilings for the linear pnl/volume components.
#[derive(Debug, Clone, Copy)]
pub struct ScoreSettings {
    pub pnl_ceiling: Decimal,
    pub volume_ceiling: Decimal,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            pnl_ceiling: Decimal::from(100_000),
            volume_ceiling: Decimal::from(1_000_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RarityInputs {
    pub pnl: Decimal,
    pub volume: Decimal,
    pub markets_traded: i32,
    /// 1-based source rank.
    pub rank: usize,
    pub has_public_identity: bool,
}

/// Bounded composite score in [0, 1000]: capped linear pnl and volume
/// contributions, a capped markets-traded term, a rank bonus that saturates
/// toward zero for low ranks, and a flat public-identity bonus. Monotonic
/// non-decreasing in pnl, volume, and markets traded.
pub fn rarity_score(inputs: &RarityInputs, settings: &ScoreSettings) -> Decimal {
    let pnl_points = linear_capped(inputs.pnl, settings.pnl_ceiling, MAX_PNL_POINTS);
    let volume_points = linear_capped(inputs.volume, settings.volume_ceiling, MAX_VOLUME_POINTS);

    let markets_points = Decimal::from(i64::from(inputs.markets_traded.max(0)) * POINTS_PER_MARKET)
        .min(Decimal::from(MAX_MARKETS_POINTS));

    let rank_points = (Decimal::from(MAX_RANK_POINTS) / Decimal::from(inputs.rank.max(1) as u64))
        .min(Decimal::from(MAX_RANK_POINTS));

    let identity_points = if inputs.has_public_identity {
        Decimal::from(IDENTITY_BONUS)
    } else {
        Decimal::ZERO
    };

    (pnl_points + volume_points + markets_points + rank_points + identity_points)
        .clamp(Decimal::ZERO, Decimal::from(MAX_SCORE))
}

/// Linear map of a non-negative value onto [0, max_points], saturating at
/// the ceiling. Negative values contribute zero.
fn linear_capped(value: Decimal, ceiling: Decimal, max_points: i64) -> Decimal {
    if ceiling <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let clamped = value.clamp(Decimal::ZERO, ceiling);
    clamped / ceiling * Decimal::from(max_points)
}
