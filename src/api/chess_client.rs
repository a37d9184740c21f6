use async_trait::async_trait;
use log::info;
use serde::de::DeserializeOwned;

use crate::api::RemoteFetcher;
use crate::api::models::{BoardDetail, MatchDetail};
use crate::config::FetcherSettings;
use crate::errors::FetchError;
use crate::http::RateLimitedClient;

/// chess.com public API client
pub struct ChessComClient {
    client: RateLimitedClient,
}

impl ChessComClient {
    pub fn new(settings: &FetcherSettings) -> anyhow::Result<Self> {
        let client = RateLimitedClient::new(settings)?;
        Ok(Self { client })
    }

    async fn fetch_typed<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, FetchError> {
        let value = self.client.get_json(url).await?;
        serde_json::from_value(value).map_err(|source| FetchError::Malformed {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl RemoteFetcher for ChessComClient {
    async fn fetch_match(&mut self, url: &str) -> Result<MatchDetail, FetchError> {
        info!("Fetching match detail: {}", url);
        self.fetch_typed(url).await
    }

    async fn fetch_board(&mut self, url: &str) -> Result<BoardDetail, FetchError> {
        info!("Fetching board: {}", url);
        self.fetch_typed(url).await
    }
}
