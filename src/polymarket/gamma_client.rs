use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GammaClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GammaEvent {
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GammaMarket {
    #[serde(alias = "conditionId", alias = "id")]
    pub condition_id: String,
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub events: Vec<GammaEvent>,
    /// Stringified JSON array of outcome token IDs, e.g. "[\"123\", \"456\"]"
    #[serde(default, alias = "clobTokenIds")]
    pub clob_token_ids: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub liquidity: Option<String>,
    #[serde(default, alias = "endDateIso", alias = "endDate")]
    pub end_date_iso: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
}

impl GammaMarket {
    /// Parse the stringified clobTokenIds defensively: a malformed value
    /// yields an empty token list for this market, never an abort.
    pub fn parse_token_ids(&self) -> Vec<String> {
        self.clob_token_ids
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
            .unwrap_or_default()
    }

    /// Event-level slug (polymarket.com/event/{slug}), falling back to the
    /// market-level slug.
    pub fn event_slug(&self) -> Option<&str> {
        self.events
            .first()
            .and_then(|e| e.slug.as_deref())
            .or(self.slug.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
}

impl GammaClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch currently open markets, volume-descending, up to `limit`.
    pub async fn get_open_markets(&self, limit: u32) -> Result<Vec<GammaMarket>, GammaClientError> {
        let url = format!("{}/markets", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("order", "volume"),
                ("ascending", "false"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let markets: Vec<GammaMarket> = resp.json().await?;
        Ok(markets)
    }
}
