use crate::models::{RankedItem, RankingMode, RankingQuery, RankingResponse, RawItem};
use crate::processor::discount;

/// Size-hint suffix Rakuten appends to medium image URLs; stripped so the
/// presentation layer gets the full-size image.
const IMAGE_SIZE_SUFFIX: &str = "?ex=128x128";

/// Turns one raw upstream response into a display-ready, mode-ordered item
/// list. Pure transformation; fetching and caching live elsewhere.
pub struct RankingNormalizer {
    affiliate_only: bool,
}

impl RankingNormalizer {
    pub fn new(affiliate_only: bool) -> Self {
        RankingNormalizer { affiliate_only }
    }

    pub fn normalize(&self, query: &RankingQuery, response: RankingResponse) -> Vec<RankedItem> {
        let mut raw: Vec<RawItem> = response.items.into_iter().map(|e| e.item).collect();

        if self.affiliate_only {
            raw.retain(|item| item.affiliate_url.as_deref().is_some_and(|u| !u.is_empty()));
        }

        match query.mode {
            // Upstream order already encodes the ranking
            RankingMode::Popularity => raw
                .into_iter()
                .enumerate()
                .map(|(idx, item)| to_ranked(idx + 1, item, None))
                .collect(),
            RankingMode::Discount => {
                let mut derived: Vec<(RawItem, f64, u8)> = raw
                    .into_iter()
                    .map(|item| {
                        let regular = discount::regular_price(&item);
                        let rate = discount::discount_rate(item.item_price, regular);
                        (item, regular, rate)
                    })
                    .collect();

                // Stable sort: equal rates keep their upstream order
                derived.sort_by(|a, b| b.2.cmp(&a.2));

                derived
                    .into_iter()
                    .enumerate()
                    .map(|(idx, (item, regular, rate))| {
                        to_ranked(idx + 1, item, Some((regular, rate)))
                    })
                    .collect()
            }
        }
    }
}

fn to_ranked(rank: usize, item: RawItem, derived: Option<(f64, u8)>) -> RankedItem {
    let image_url = display_image(&item);
    let url = match item.affiliate_url {
        Some(affiliate) if !affiliate.is_empty() => affiliate,
        _ => item.item_url,
    };

    RankedItem {
        rank,
        name: item.item_name,
        price: item.item_price,
        url,
        image_url,
        shop_name: item.shop_name,
        regular_price: derived.map(|(regular, _)| regular),
        discount_rate: derived.map(|(_, rate)| rate),
    }
}

fn display_image(item: &RawItem) -> Option<String> {
    if let Some(large) = item.large_image_urls.first() {
        return Some(large.image_url.clone());
    }
    item.medium_image_urls
        .first()
        .map(|medium| medium.image_url.replace(IMAGE_SIZE_SUFFIX, ""))
}
