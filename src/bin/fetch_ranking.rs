use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use rakuten_ranking::config::RakutenConfig;
use rakuten_ranking::fetcher::{RankingFetcher, RankingSource};
use rakuten_ranking::models::{RankingMode, RankingQuery};
use rakuten_ranking::processor::{RankingNormalizer, RankingService};

/// Fetches one genre in both ranking modes and prints the results.
/// Usage: fetch_ranking [genre_id]
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = RakutenConfig::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let genre_arg = env::args().nth(1);
    let genre_id = config.resolve_genre(genre_arg.as_deref()).to_string();

    let source: Arc<dyn RankingSource> = Arc::new(RankingFetcher::new(config.clone())?);
    let service = RankingService::new(
        source,
        RankingNormalizer::new(config.affiliate_only),
        config.cache_ttl_secs,
    );

    for mode in [RankingMode::Popularity, RankingMode::Discount] {
        let query = RankingQuery::new(genre_id.clone(), mode);
        println!("\n=== Genre {} ({} mode) ===", genre_id, mode.as_str());

        match service.get_ranking(&query).await {
            Ok(result) if result.is_empty() => println!("No items found."),
            Ok(result) => {
                for item in &result.items {
                    match item.discount_rate {
                        Some(rate) => println!(
                            "{:>2}. {} — ¥{} ({}% off, regular ¥{:.0}) [{}]",
                            item.rank,
                            item.name,
                            item.price,
                            rate,
                            item.regular_price.unwrap_or_default(),
                            item.shop_name
                        ),
                        None => println!(
                            "{:>2}. {} — ¥{} [{}]",
                            item.rank, item.name, item.price, item.shop_name
                        ),
                    }
                }
                println!("✅ {} items", result.items.len());
            }
            Err(e) => println!("❌ Fetch failed: {e}"),
        }
    }

    Ok(())
}
