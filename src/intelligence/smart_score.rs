use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, MathematicalOps};
use std::cmp::Reverse;
use std::collections::HashSet;

use crate::models::{NewSmartStats, Tier, TraderSummary};

/// 0.5 points per distinct tier represented among holders.
const DIVERSITY_BONUS_PER_TIER: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
/// Snapshot keeps at most this many trader summaries.
const TOP_TRADERS_CAP: usize = 10;

/// A trader verified to hold a position in the market.
#[derive(Debug, Clone)]
pub struct MarketHolder {
    pub address: String,
    pub display_name: String,
    pub tier: Tier,
    pub rarity_score: Decimal,
}

/// Aggregate verified holders into a smart-money snapshot.
///
/// smart_score = (sum of tier weights + 0.5 x distinct tiers)
///             x log10(max(volume, 1))
///
/// Returns None when no holder was verified: such markets are dropped from
/// the published ranking entirely.
pub fn compute_market_stats(
    market_id: &str,
    market_volume: Decimal,
    holders: &[MarketHolder],
    computed_at: DateTime<Utc>,
) -> Option<NewSmartStats> {
    // Distinct by address; the verifier emits sets but stay defensive here.
    let mut seen: HashSet<&str> = HashSet::new();
    let distinct: Vec<&MarketHolder> = holders
        .iter()
        .filter(|h| seen.insert(h.address.as_str()))
        .collect();

    if distinct.is_empty() {
        return None;
    }

    let smart_count = distinct.len() as i32;
    let smart_weighted: Decimal = distinct.iter().map(|h| h.rarity_score).sum();

    let weight_sum: Decimal = distinct.iter().map(|h| h.tier.weight()).sum();
    let distinct_tiers = distinct.iter().map(|h| h.tier).collect::<HashSet<_>>().len();
    let diversity_bonus = DIVERSITY_BONUS_PER_TIER * Decimal::from(distinct_tiers as u64);

    let volume_factor = market_volume.max(Decimal::ONE).log10();
    let smart_score = (weight_sum + diversity_bonus) * volume_factor;

    let mut ordered = distinct;
    ordered.sort_by_key(|h| (Reverse(h.rarity_score), h.address.clone()));

    let top_smart_traders: Vec<TraderSummary> = ordered
        .iter()
        .take(TOP_TRADERS_CAP)
        .map(|h| TraderSummary {
            address: h.address.clone(),
            display_name: h.display_name.clone(),
            tier: h.tier.as_str().to_string(),
            rarity_score: h.rarity_score,
        })
        .collect();

    Some(NewSmartStats {
        market_id: market_id.to_string(),
        computed_at,
        smart_count,
        smart_weighted,
        smart_score,
        top_smart_traders,
    })
}

/// Published ranking order: smart_score desc, ties by smart_count desc, then
/// by total weighted shares desc.
pub fn rank_markets(mut stats: Vec<NewSmartStats>) -> Vec<NewSmartStats> {
    stats.sort_by(|a, b| {
        b.smart_score
            .cmp(&a.smart_score)
            .then(b.smart_count.cmp(&a.smart_count))
            .then(b.smart_weighted.cmp(&a.smart_weighted))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(address: &str, tier: Tier, rarity: i64) -> MarketHolder {
        MarketHolder {
            address: address.into(),
            display_name: format!("trader {address}"),
            tier,
            rarity_score: Decimal::from(rarity),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_zero_holders_dropped() {
        assert!(compute_market_stats("m1", Decimal::from(1_000_000), &[], now()).is_none());
    }

    #[test]
    fn test_counts_and_weights() {
        let holders = vec![
            holder("0xa", Tier::S, 800),
            holder("0xb", Tier::A, 500),
            holder("0xa", Tier::S, 800), // duplicate address ignored
        ];
        let stats = compute_market_stats("m1", Decimal::from(10), &holders, now()).unwrap();
        assert_eq!(stats.smart_count, 2);
        assert_eq!(stats.smart_weighted, Decimal::from(1_300));
        // (5 + 3 + 0.5 * 2) * log10(10) = 9; log10 is series-approximated
        let tolerance = Decimal::new(1, 6);
        assert!((stats.smart_score - Decimal::from(9)).abs() < tolerance);
        assert_eq!(stats.top_smart_traders[0].address, "0xa");
    }

    #[test]
    fn test_determinism() {
        let holders = vec![
            holder("0xa", Tier::S, 900),
            holder("0xb", Tier::B, 300),
        ];
        let at = now();
        let one = compute_market_stats("m1", Decimal::from(250_000), &holders, at).unwrap();
        let two = compute_market_stats("m1", Decimal::from(250_000), &holders, at).unwrap();
        assert_eq!(one.smart_score, two.smart_score);
        assert_eq!(one.top_smart_traders, two.top_smart_traders);
    }

    #[test]
    fn test_tiny_volume_scores_zero() {
        let holders = vec![holder("0xa", Tier::S, 900)];
        let stats = compute_market_stats("m1", Decimal::ONE, &holders, now()).unwrap();
        assert!(stats.smart_score.abs() < Decimal::new(1, 6));
    }

    #[test]
    fn test_scenario_market_a_beats_market_b() {
        // Market A: 3 holders, tier-weight sum 10 (S+A+B), volume 1,000,000
        let a_holders = vec![
            holder("0xa1", Tier::S, 700),
            holder("0xa2", Tier::A, 500),
            holder("0xa3", Tier::B, 300),
        ];
        // Market B: 1 holder, tier-weight sum 5 (S), volume 500,000
        let b_holders = vec![holder("0xb1", Tier::S, 900)];

        let at = now();
        let a = compute_market_stats("A", Decimal::from(1_000_000), &a_holders, at).unwrap();
        let b = compute_market_stats("B", Decimal::from(500_000), &b_holders, at).unwrap();

        assert!(a.smart_score > b.smart_score);

        let ranked = rank_markets(vec![b, a]);
        assert_eq!(ranked[0].market_id, "A");
        assert_eq!(ranked[1].market_id, "B");
    }

    #[test]
    fn test_tie_breaks() {
        let at = now();
        let mk = |id: &str, score: i64, count: i32, weighted: i64| NewSmartStats {
            market_id: id.into(),
            computed_at: at,
            smart_count: count,
            smart_weighted: Decimal::from(weighted),
            smart_score: Decimal::from(score),
            top_smart_traders: vec![],
        };

        let ranked = rank_markets(vec![
            mk("low_score", 5, 9, 900),
            mk("tie_low_count", 10, 2, 500),
            mk("tie_high_count", 10, 4, 100),
            mk("tie_all_but_weight", 10, 4, 300),
        ]);

        let order: Vec<&str> = ranked.iter().map(|s| s.market_id.as_str()).collect();
        assert_eq!(
            order,
            vec!["tie_all_but_weight", "tie_high_count", "tie_low_count", "low_score"]
        );
    }

    #[test]
    fn test_top_traders_ordered_by_rarity_and_capped() {
        let holders: Vec<MarketHolder> = (0..15)
            .map(|i| holder(&format!("0x{i:02}"), Tier::A, 100 + i))
            .collect();
        let stats = compute_market_stats("m1", Decimal::from(1_000), &holders, now()).unwrap();
        assert_eq!(stats.top_smart_traders.len(), 10);
        assert_eq!(stats.top_smart_traders[0].rarity_score, Decimal::from(114));
        assert!(stats
            .top_smart_traders
            .windows(2)
            .all(|w| w[0].rarity_score >= w[1].rarity_score));
    }
}
