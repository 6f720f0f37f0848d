use alloy::primitives::{Address, U256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ERC-1155 balanceOf(address,uint256) function selector.
const BALANCE_OF_SELECTOR: &str = "00fdd58e";

#[derive(Debug, Error)]
pub enum RpcClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed RPC response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// A single eth_call to batch.
#[derive(Debug, Clone)]
pub struct EthCall {
    pub to: Address,
    pub data: String,
}

/// Thin JSON-RPC client. Balance lookups are aggregated into one batch
/// request per group of markets to amortize the round trip.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Execute a batch of eth_calls in one HTTP round trip. The returned
    /// vector is indexed like `calls`; an item that errored or could not be
    /// decoded is None.
    pub async fn batch_eth_call(
        &self,
        calls: &[EthCall],
    ) -> Result<Vec<Option<U256>>, RpcClientError> {
        let body: Vec<RpcRequest> = calls
            .iter()
            .enumerate()
            .map(|(i, call)| RpcRequest {
                jsonrpc: "2.0",
                id: i as u64,
                method: "eth_call",
                params: serde_json::json!([
                    { "to": call.to.to_string(), "data": call.data },
                    "latest",
                ]),
            })
            .collect();

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let responses: Vec<RpcResponse> = resp
            .json()
            .await
            .map_err(|e| RpcClientError::Malformed(e.to_string()))?;

        Ok(collect_batch_results(responses, calls.len()))
    }
}

/// Map batch responses back onto call slots by id; batch responses may
/// arrive out of order. An errored, unknown-id, or undecodable item leaves
/// its slot None without touching any other slot.
fn collect_batch_results(responses: Vec<RpcResponse>, len: usize) -> Vec<Option<U256>> {
    let mut out: Vec<Option<U256>> = vec![None; len];
    for r in responses {
        let Some(id) = r.id else { continue };
        let idx = id as usize;
        if idx >= out.len() {
            continue;
        }
        if let Some(err) = r.error {
            tracing::debug!(id = id, error = %err, "eth_call item failed in batch");
            continue;
        }
        out[idx] = r.result.as_deref().and_then(decode_u256);
    }
    out
}

/// ABI-encode a balanceOf(owner, tokenId) call.
pub fn encode_balance_of(owner: Address, token_id: U256) -> String {
    let owner_hex = format!("{owner:x}");
    let token_hex = format!("{token_id:x}");
    format!("0x{BALANCE_OF_SELECTOR}{owner_hex:0>64}{token_hex:0>64}")
}

/// Decode a 32-byte hex return value. Empty or unparseable data is None,
/// which callers treat as unknown / no position.
pub fn decode_u256(hex: &str) -> Option<U256> {
    let s = hex.trim_start_matches("0x");
    if s.is_empty() {
        return None;
    }
    U256::from_str_radix(s, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_encode_balance_of_layout() {
        let owner = Address::from_str("0x00000000000000000000000000000000000000ff").unwrap();
        let data = encode_balance_of(owner, U256::from(7u64));

        // 0x + 4-byte selector + two 32-byte words
        assert_eq!(data.len(), 2 + 8 + 64 + 64);
        assert!(data.starts_with("0x00fdd58e"));
        assert!(data[10..74].ends_with("ff"));
        assert!(data[74..].ends_with("7"));
        assert!(data[74..137].chars().all(|c| c == '0'));
    }

    fn resp(
        id: Option<u64>,
        result: Option<&str>,
        error: Option<serde_json::Value>,
    ) -> RpcResponse {
        RpcResponse {
            id,
            result: result.map(String::from),
            error,
        }
    }

    #[test]
    fn test_batch_results_survive_one_failed_item() {
        // Out-of-order ids, one reverted call: the other slots still fill.
        let out = collect_batch_results(
            vec![
                resp(Some(2), Some("0x5"), None),
                resp(
                    Some(0),
                    None,
                    Some(serde_json::json!({"code": -32000, "message": "execution reverted"})),
                ),
                resp(Some(1), Some("0x3"), None),
            ],
            3,
        );
        assert_eq!(out, vec![None, Some(U256::from(3u64)), Some(U256::from(5u64))]);
    }

    #[test]
    fn test_batch_results_tolerate_undecodable_and_stray_ids() {
        let out = collect_batch_results(
            vec![
                resp(Some(0), Some("not-hex"), None),
                resp(Some(1), Some("0x1"), None),
                resp(Some(9), Some("0x1"), None),
                resp(None, Some("0x1"), None),
            ],
            2,
        );
        assert_eq!(out, vec![None, Some(U256::from(1u64))]);
    }

    #[test]
    fn test_decode_u256() {
        assert_eq!(decode_u256("0x0"), Some(U256::ZERO));
        assert_eq!(
            decode_u256("0x0000000000000000000000000000000000000000000000000000000000000005"),
            Some(U256::from(5u64))
        );
        assert_eq!(decode_u256("0x"), None);
        assert_eq!(decode_u256("not-hex"), None);
    }
}
