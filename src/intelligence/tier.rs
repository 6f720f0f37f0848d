use rust_decimal::Decimal;

use crate::models::Tier;

// Canonical rule set (six tiers, identity floor = A). Percentile is
// (rank_index + 1) / total over the pnl-descending batch.
const IDENTIFIED_TOP_CUTOFF: Decimal = Decimal::from_parts(5, 0, 0, false, 2); // 0.05
const ANON_B_CUTOFF: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10
const ANON_C_CUTOFF: Decimal = Decimal::from_parts(35, 0, 0, false, 2); // 0.35
const ANON_D_CUTOFF: Decimal = Decimal::from_parts(70, 0, 0, false, 2); // 0.70

/// Classify a trader from its position in the ranked batch.
///
/// Pure and deterministic: same (rank_index, total, has_public_identity),
/// same tier, run to run.
///
/// - Public identity guarantees a floor of A, with a tighter cutoff (top 5%)
///   for S.
/// - Anonymous traders fall into B/C/D/E percentile bands and never reach S
///   or A.
pub fn classify(rank_index: usize, total: usize, has_public_identity: bool) -> Tier {
    if total == 0 {
        return Tier::E;
    }

    let percentile = Decimal::from((rank_index + 1) as u64) / Decimal::from(total as u64);

    if has_public_identity {
        if percentile <= IDENTIFIED_TOP_CUTOFF {
            Tier::S
        } else {
            Tier::A
        }
    } else if percentile <= ANON_B_CUTOFF {
        Tier::B
    } else if percentile <= ANON_C_CUTOFF {
        Tier::C
    } else if percentile <= ANON_D_CUTOFF {
        Tier::D
    } else {
        Tier::E
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_tier_floor_holds_for_any_list_size() {
        for total in [1usize, 2, 5, 40, 100, 1_000] {
            for rank_index in 0..total {
                let tier = classify(rank_index, total, true);
                assert!(
                    tier.ordinal() <= Tier::A.ordinal(),
                    "identified trader at {}/{} got {}",
                    rank_index,
                    total,
                    tier
                );
            }
        }
    }

    #[test]
    fn test_identified_top_percentile_is_s() {
        // rank 1 of 40 -> percentile 0.025 <= 0.05
        assert_eq!(classify(0, 40, true), Tier::S);
        // rank 3 of 40 -> 0.075 > 0.05
        assert_eq!(classify(2, 40, true), Tier::A);
    }

    #[test]
    fn test_anonymous_bands() {
        let total = 100;
        assert_eq!(classify(0, total, false), Tier::B); // 0.01
        assert_eq!(classify(9, total, false), Tier::B); // 0.10
        assert_eq!(classify(10, total, false), Tier::C); // 0.11
        assert_eq!(classify(34, total, false), Tier::C); // 0.35
        assert_eq!(classify(35, total, false), Tier::D); // 0.36
        assert_eq!(classify(69, total, false), Tier::D); // 0.70
        assert_eq!(classify(70, total, false), Tier::E); // 0.71
        assert_eq!(classify(99, total, false), Tier::E);
    }

    #[test]
    fn test_anonymous_never_reaches_top_two_tiers() {
        for total in [1usize, 10, 500] {
            for rank_index in 0..total {
                let tier = classify(rank_index, total, false);
                assert!(tier != Tier::S && tier != Tier::A);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for rank_index in 0..200 {
            assert_eq!(
                classify(rank_index, 200, rank_index % 3 == 0),
                classify(rank_index, 200, rank_index % 3 == 0)
            );
        }
    }

    #[test]
    fn test_single_entry_list() {
        // N = 1: percentile 1.0
        assert_eq!(classify(0, 1, true), Tier::A);
        assert_eq!(classify(0, 1, false), Tier::E);
    }

    #[test]
    fn test_empty_list_defaults_to_lowest() {
        assert_eq!(classify(0, 0, true), Tier::E);
    }
}
