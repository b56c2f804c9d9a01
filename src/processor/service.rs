use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::fetcher::{FetchError, RankingSource};
use crate::models::{RankingQuery, RankingResult};

type CacheSlot = Arc<OnceCell<Arc<RankingResult>>>;

/// Fetch lifecycle for ranking queries: caches results per (genre, mode)
/// key and collapses concurrent identical queries into one upstream call.
/// Errors are never cached; a failed slot is retried on the next request.
pub struct RankingService {
    source: Arc<dyn RankingSource>,
    normalizer: super::RankingNormalizer,
    cache_ttl: Duration,
    cache: Mutex<HashMap<RankingQuery, CacheSlot>>,
}

impl RankingService {
    pub fn new(
        source: Arc<dyn RankingSource>,
        normalizer: super::RankingNormalizer,
        cache_ttl_secs: i64,
    ) -> Self {
        RankingService {
            source,
            normalizer,
            cache_ttl: Duration::seconds(cache_ttl_secs),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_ranking(
        &self,
        query: &RankingQuery,
    ) -> Result<Arc<RankingResult>, FetchError> {
        let slot = self.slot_for(query);

        let result = slot
            .get_or_try_init(|| async {
                let response = self.source.fetch_ranking(query).await.inspect_err(|e| {
                    warn!(
                        "Fetch failed for genre {} ({} mode): {}",
                        query.genre_id,
                        query.mode.as_str(),
                        e
                    );
                })?;

                let items = self.normalizer.normalize(query, response);
                if items.is_empty() {
                    info!(
                        "No items for genre {} ({} mode)",
                        query.genre_id,
                        query.mode.as_str()
                    );
                }

                Ok::<_, FetchError>(Arc::new(RankingResult {
                    query: query.clone(),
                    items,
                    fetched_at: Utc::now(),
                }))
            })
            .await?;

        Ok(result.clone())
    }

    /// Look up the cache slot for a key, sweeping every expired entry
    /// first so the map stays bounded by the set of keys fetched within
    /// one TTL window. The lock is never held across an await.
    fn slot_for(&self, query: &RankingQuery) -> CacheSlot {
        let mut cache = self.cache.lock().expect("ranking cache poisoned");

        let now = Utc::now();
        cache.retain(|_, slot| match slot.get() {
            Some(result) => now - result.fetched_at <= self.cache_ttl,
            // Still in flight
            None => true,
        });

        cache.entry(query.clone()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemEnvelope, RankingMode, RankingResponse, RawItem};
    use crate::processor::RankingNormalizer;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    fn raw(name: &str, price: u64) -> ItemEnvelope {
        ItemEnvelope {
            item: RawItem {
                item_name: name.to_string(),
                item_price: price,
                item_price_before_discount: None,
                item_url: format!("https://item.rakuten.co.jp/{name}/"),
                affiliate_url: None,
                medium_image_urls: vec![],
                large_image_urls: vec![],
                shop_name: "shop".to_string(),
                rank: None,
            },
        }
    }

    /// Scripted source: counts calls, optionally delays, optionally fails.
    struct ScriptedSource {
        items: Vec<ItemEnvelope>,
        delay_ms: u64,
        fail: Option<FetchError>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn with_items(items: Vec<ItemEnvelope>) -> Self {
            ScriptedSource {
                items,
                delay_ms: 0,
                fail: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(error: FetchError) -> Self {
            ScriptedSource {
                items: vec![],
                delay_ms: 0,
                fail: Some(error),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RankingSource for ScriptedSource {
        async fn fetch_raw(&self, _query: &RankingQuery) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(StdDuration::from_millis(self.delay_ms)).await;
            }
            if let Some(error) = &self.fail {
                return Err(error.clone());
            }
            let response = RankingResponse {
                items: self.items.clone(),
            };
            Ok(serde_json::to_value(response).unwrap())
        }
    }

    fn service_over(source: Arc<ScriptedSource>, ttl_secs: i64) -> RankingService {
        RankingService::new(source, RankingNormalizer::new(false), ttl_secs)
    }

    #[tokio::test]
    async fn test_result_is_cached_per_key() {
        let source = Arc::new(ScriptedSource::with_items(vec![raw("a", 1000)]));
        let service = service_over(source.clone(), 300);
        let query = RankingQuery::new("555164", RankingMode::Popularity);

        let first = service.get_ranking(&query).await.unwrap();
        let second = service.get_ranking(&query).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let source = Arc::new(ScriptedSource::with_items(vec![raw("a", 1000)]));
        let service = service_over(source.clone(), 300);

        service
            .get_ranking(&RankingQuery::new("555164", RankingMode::Popularity))
            .await
            .unwrap();
        service
            .get_ranking(&RankingQuery::new("555164", RankingMode::Discount))
            .await
            .unwrap();

        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_identical_queries_dedup_to_one_fetch() {
        let mut source = ScriptedSource::with_items(vec![raw("a", 1000)]);
        source.delay_ms = 50;
        let source = Arc::new(source);
        let service = Arc::new(service_over(source.clone(), 300));
        let query = RankingQuery::new("100227", RankingMode::Popularity);

        let futures = (0..4).map(|_| {
            let service = service.clone();
            let query = query.clone();
            async move { service.get_ranking(&query).await }
        });
        let results = futures::future::join_all(futures).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let source = Arc::new(ScriptedSource::failing(FetchError::Timeout));
        let service = service_over(source.clone(), 300);
        let query = RankingQuery::new("555164", RankingMode::Popularity);

        assert_eq!(
            service.get_ranking(&query).await.unwrap_err(),
            FetchError::Timeout
        );
        assert_eq!(
            service.get_ranking(&query).await.unwrap_err(),
            FetchError::Timeout
        );
        // Each attempt went upstream again
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_response_is_success_not_failure() {
        let source = Arc::new(ScriptedSource::with_items(vec![]));
        let service = service_over(source, 300);
        let query = RankingQuery::new("555164", RankingMode::Popularity);

        let result = service.get_ranking(&query).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_stale_entries_are_swept_on_any_access() {
        let source = Arc::new(ScriptedSource::with_items(vec![raw("a", 1000)]));
        let service = service_over(source.clone(), 0);
        let query_a = RankingQuery::new("555164", RankingMode::Popularity);
        let query_b = RankingQuery::new("100227", RankingMode::Popularity);

        service.get_ranking(&query_a).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        service.get_ranking(&query_b).await.unwrap();

        // Accessing B evicted A's expired entry; the map does not grow
        // with keys that are never queried again
        let cache = service.cache.lock().unwrap();
        assert!(!cache.contains_key(&query_a));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let source = Arc::new(ScriptedSource::with_items(vec![raw("a", 1000)]));
        // TTL of zero: every access after the first sees a stale entry
        let service = service_over(source.clone(), 0);
        let query = RankingQuery::new("555164", RankingMode::Popularity);

        service.get_ranking(&query).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        service.get_ranking(&query).await.unwrap();

        assert_eq!(source.call_count(), 2);
    }
}
