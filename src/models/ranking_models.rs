use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the ranking for a genre is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Upstream popularity ranking, order taken verbatim from the API.
    Popularity,
    /// Client-derived discount ranking, sorted by computed discount rate.
    Discount,
}

impl RankingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMode::Popularity => "popularity",
            RankingMode::Discount => "discount",
        }
    }
}

/// One unit of fetchable work. Identical queries are cache-equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankingQuery {
    pub genre_id: String,
    pub mode: RankingMode,
}

impl RankingQuery {
    pub fn new(genre_id: impl Into<String>, mode: RankingMode) -> Self {
        RankingQuery {
            genre_id: genre_id.into(),
            mode,
        }
    }
}

/// Top-level envelope of both the IchibaItemRanking and IchibaItemSearch
/// responses. Fields we do not consume are dropped on decode; the proxy
/// route forwards the raw body instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(rename = "Items", default)]
    pub items: Vec<ItemEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEnvelope {
    #[serde(rename = "Item")]
    pub item: RawItem,
}

/// One upstream item record, immutable once decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub item_name: String,
    pub item_price: u64,
    #[serde(default)]
    pub item_price_before_discount: Option<u64>,
    pub item_url: String,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    #[serde(default)]
    pub medium_image_urls: Vec<ImageUrl>,
    #[serde(default)]
    pub large_image_urls: Vec<ImageUrl>,
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// A display-ready item. `regular_price` and `discount_rate` are only
/// populated in Discount mode.
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    pub rank: usize,
    pub name: String,
    pub price: u64,
    pub url: String,
    pub image_url: Option<String>,
    pub shop_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<u8>,
}

/// The materialized ranking for one query.
#[derive(Debug, Clone, Serialize)]
pub struct RankingResult {
    pub query: RankingQuery,
    pub items: Vec<RankedItem>,
    pub fetched_at: DateTime<Utc>,
}

impl RankingResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
