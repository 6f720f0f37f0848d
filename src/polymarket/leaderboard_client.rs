use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use super::types::LeaderboardEntry;

#[derive(Debug, Error)]
pub enum LeaderboardClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Pagination knobs for a full leaderboard fetch.
#[derive(Debug, Clone, Copy)]
pub struct PageSettings {
    pub page_size: u32,
    pub max_offset: u32,
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    http: Client,
    base_url: String,
}

impl LeaderboardClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch a single leaderboard page for a time window and sort key.
    pub async fn fetch_page(
        &self,
        window: &str,
        sort: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardClientError> {
        let url = format!("{}/leaderboard", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("window", window),
                ("rankType", sort),
                ("limit", &limit.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let entries: Vec<LeaderboardEntry> = resp.json().await?;
        Ok(entries)
    }

    /// Fetch the full ranked list page by page, strictly sequentially with a
    /// fixed inter-page delay. A failed page after the first truncates the
    /// result (logged, not an error); the next scheduled run fetches again.
    /// Only a failure on the very first page is fatal to the pass.
    pub async fn fetch_all(
        &self,
        window: &str,
        sort: &str,
        pages: PageSettings,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardClientError> {
        let mut all: Vec<LeaderboardEntry> = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let batch = match self.fetch_page(window, sort, pages.page_size, offset).await {
                Ok(b) => b,
                Err(e) if offset == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        offset = offset,
                        fetched = all.len(),
                        "Leaderboard page failed, keeping partial results"
                    );
                    break;
                }
            };

            if batch.is_empty() {
                break;
            }

            let batch_len = batch.len();
            all.extend(batch);

            if batch_len < pages.page_size as usize {
                break;
            }

            offset += pages.page_size;
            if offset >= pages.max_offset {
                tracing::debug!(max_offset = pages.max_offset, "Leaderboard max offset reached");
                break;
            }

            sleep(Duration::from_millis(pages.page_delay_ms)).await;
        }

        Ok(all)
    }
}
