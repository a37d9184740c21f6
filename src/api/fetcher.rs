use async_trait::async_trait;

use crate::api::models::{BoardDetail, MatchDetail};
use crate::errors::FetchError;

/// Source of remote match and board details
#[async_trait]
pub trait RemoteFetcher: Send {
    async fn fetch_match(&mut self, url: &str) -> Result<MatchDetail, FetchError>;

    async fn fetch_board(&mut self, url: &str) -> Result<BoardDetail, FetchError>;
}
