use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rakuten_ranking::config::RakutenConfig;
use rakuten_ranking::fetcher::{RankingFetcher, RankingSource};
use rakuten_ranking::processor::{RankingNormalizer, RankingService};
use rakuten_ranking::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = RakutenConfig::from_env().context("Failed to load configuration")?;

    if !config.has_application_id() {
        // The server still starts; upstream calls fail with a config error
        warn!("RAKUTEN_APP_ID is not set; Rakuten API calls will be rejected");
    }
    if config.affiliate_id.is_none() {
        info!("No affiliate id configured; affiliate links will be absent");
    }

    let source: Arc<dyn RankingSource> = Arc::new(
        RankingFetcher::new(config.clone()).context("Failed to build Rakuten fetcher")?,
    );
    let service = RankingService::new(
        source.clone(),
        RankingNormalizer::new(config.affiliate_only),
        config.cache_ttl_secs,
    );

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState {
        config,
        source,
        service,
    });
    let app = server::router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("🚀 Ranking server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server ended with error")?;

    Ok(())
}
