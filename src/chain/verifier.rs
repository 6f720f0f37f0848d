use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use futures_util::stream::{self, StreamExt};

use super::rpc::{encode_balance_of, EthCall, RpcClient};

/// A market whose outcome-token holdings should be verified.
#[derive(Debug, Clone)]
pub struct CandidateMarket {
    pub market_id: String,
    pub token_ids: Vec<String>,
}

/// Batched on-chain check of trader holdings. Markets are chunked into
/// groups; each group becomes one aggregated balance batch, and groups run
/// with bounded concurrency. A failure for any pairing inside a batch is
/// recorded as no-position and never aborts the rest.
pub struct PositionVerifier {
    rpc: RpcClient,
    ctf: Address,
    group_size: usize,
}

impl PositionVerifier {
    pub fn new(rpc: RpcClient, ctf_address: &str, group_size: usize) -> anyhow::Result<Self> {
        let ctf = Address::from_str(ctf_address)
            .map_err(|e| anyhow::anyhow!("invalid CTF address {ctf_address}: {e}"))?;
        Ok(Self {
            rpc,
            ctf,
            group_size: group_size.max(1),
        })
    }

    /// For each market, the set of trader addresses holding a nonzero
    /// balance of any of that market's outcome tokens.
    pub async fn verify_holdings(
        &self,
        markets: &[CandidateMarket],
        trader_addresses: &[String],
    ) -> HashMap<String, HashSet<String>> {
        let traders: Vec<(String, Address)> = trader_addresses
            .iter()
            .filter_map(|a| match Address::from_str(a) {
                Ok(parsed) => Some((a.clone(), parsed)),
                Err(e) => {
                    tracing::debug!(address = %a, error = %e, "Skipping unparseable trader address");
                    None
                }
            })
            .collect();

        let mut holders: HashMap<String, HashSet<String>> = markets
            .iter()
            .map(|m| (m.market_id.clone(), HashSet::new()))
            .collect();

        if traders.is_empty() || markets.is_empty() {
            return holders;
        }

        let group_results: Vec<HashMap<String, HashSet<String>>> =
            stream::iter(markets.chunks(self.group_size))
                .map(|group| self.verify_group(group, &traders))
                .buffer_unordered(self.group_size)
                .collect()
                .await;

        for group in group_results {
            for (market_id, set) in group {
                holders.entry(market_id).or_default().extend(set);
            }
        }

        holders
    }

    /// One aggregated balance batch for a group of markets.
    async fn verify_group(
        &self,
        group: &[CandidateMarket],
        traders: &[(String, Address)],
    ) -> HashMap<String, HashSet<String>> {
        let mut holders: HashMap<String, HashSet<String>> = group
            .iter()
            .map(|m| (m.market_id.clone(), HashSet::new()))
            .collect();

        let mut calls: Vec<EthCall> = Vec::new();
        let mut keys: Vec<(usize, usize)> = Vec::new();

        for (mi, market) in group.iter().enumerate() {
            for raw_token in &market.token_ids {
                let token_id = match U256::from_str(raw_token) {
                    Ok(t) => t,
                    Err(_) => {
                        tracing::debug!(
                            market_id = %market.market_id,
                            token = %raw_token,
                            "Skipping malformed outcome token id"
                        );
                        continue;
                    }
                };
                for (ti, (_, addr)) in traders.iter().enumerate() {
                    calls.push(EthCall {
                        to: self.ctf,
                        data: encode_balance_of(*addr, token_id),
                    });
                    keys.push((mi, ti));
                }
            }
        }

        if calls.is_empty() {
            return holders;
        }

        let results = match self.rpc.batch_eth_call(&calls).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    markets = group.len(),
                    calls = calls.len(),
                    "Balance batch failed, recording no positions for this group"
                );
                return holders;
            }
        };

        for (idx, result) in results.iter().enumerate() {
            // None = errored or undecodable pairing -> unknown / no position
            let Some(balance) = result else { continue };
            if balance.is_zero() {
                continue;
            }
            let (mi, ti) = keys[idx];
            if let Some(set) = holders.get_mut(&group[mi].market_id) {
                set.insert(traders[ti].0.clone());
            }
        }

        holders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, tokens: &[&str]) -> CandidateMarket {
        CandidateMarket {
            market_id: id.into(),
            token_ids: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_empty_inputs_produce_empty_holder_sets() {
        let verifier = PositionVerifier::new(
            RpcClient::new(reqwest::Client::new(), "http://localhost:0"),
            "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045",
            5,
        )
        .unwrap();

        let markets = vec![candidate("m1", &["123"])];
        let holders = verifier.verify_holdings(&markets, &[]).await;
        assert_eq!(holders.len(), 1);
        assert!(holders["m1"].is_empty());
    }

    #[test]
    fn test_invalid_ctf_address_rejected() {
        let rpc = RpcClient::new(reqwest::Client::new(), "http://localhost:0");
        assert!(PositionVerifier::new(rpc, "not-an-address", 5).is_err());
    }
}
