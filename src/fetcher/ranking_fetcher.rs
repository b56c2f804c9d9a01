use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

use crate::config::RakutenConfig;
use crate::fetcher::FetchError;
use crate::models::{RankingMode, RankingQuery, RankingResponse};

const RANKING_ENDPOINT: &str = "IchibaItemRanking/20170628";
const SEARCH_ENDPOINT: &str = "IchibaItemSearch/20220601";

/// Source of raw ranking data. The production implementation is
/// `RankingFetcher`; tests substitute scripted sources.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Issue exactly one upstream request and return the raw JSON body.
    async fn fetch_raw(&self, query: &RankingQuery) -> Result<Value, FetchError>;

    /// Fetch and decode into the typed item envelope.
    async fn fetch_ranking(&self, query: &RankingQuery) -> Result<RankingResponse, FetchError> {
        let raw = self.fetch_raw(query).await?;
        serde_json::from_value(raw).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Thin gateway to the Rakuten Ichiba API. One GET per call, no retries,
/// no caching; the service layer owns the cache.
pub struct RankingFetcher {
    client: Client,
    config: RakutenConfig,
}

impl RankingFetcher {
    pub fn new(config: RakutenConfig) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(RankingFetcher { client, config })
    }

    /// Build the upstream URL for a query. Popularity uses the ranking
    /// endpoint as-is; Discount uses the search endpoint sorted by
    /// ascending price with a minimum-price floor, and the discount
    /// ordering itself is computed by the normalizer.
    pub fn build_url(&self, query: &RankingQuery) -> Result<String, FetchError> {
        let app_id = self
            .config
            .application_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FetchError::Config("RAKUTEN_APP_ID is not set".to_string()))?;

        // Genre ids are numeric upstream; anything else could smuggle
        // extra query parameters into the interpolated URL
        if query.genre_id.is_empty() || !query.genre_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FetchError::Config(format!(
                "invalid genreId: {:?}",
                query.genre_id
            )));
        }

        let mut url = match query.mode {
            RankingMode::Popularity => format!(
                "{}/{}?format=json&applicationId={}&genreId={}&hits={}",
                self.config.base_url, RANKING_ENDPOINT, app_id, query.genre_id, self.config.hits
            ),
            RankingMode::Discount => format!(
                "{}/{}?format=json&applicationId={}&genreId={}&hits={}&sort=%2BitemPrice&minPrice={}",
                self.config.base_url,
                SEARCH_ENDPOINT,
                app_id,
                query.genre_id,
                self.config.hits,
                self.config.min_price
            ),
        };

        if let Some(affiliate_id) = self
            .config
            .affiliate_id
            .as_deref()
            .filter(|id| !id.is_empty())
        {
            url.push_str(&format!("&affiliateId={affiliate_id}"));
        }

        Ok(url)
    }
}

#[async_trait]
impl RankingSource for RankingFetcher {
    async fn fetch_raw(&self, query: &RankingQuery) -> Result<Value, FetchError> {
        let url = self.build_url(query)?;
        debug!("Fetching {} ranking from {}", query.mode.as_str(), url);

        let request = async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Upstream {
                    status: Some(status.as_u16()),
                    message: format!("Rakuten API returned {status}"),
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()))
        };

        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let body = match tokio::time::timeout(timeout, request).await {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout),
        };

        info!(
            "Fetched genre {} ({} mode)",
            query.genre_id,
            query.mode.as_str()
        );
        Ok(body)
    }
}
