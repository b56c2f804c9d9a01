use anyhow::Result;
use std::env;

/// Fallback genre id when the caller has made no selection
/// (top-level home electronics genre).
pub const DEFAULT_GENRE_ID: &str = "555164";

/// Process-wide Rakuten API configuration. Built once at startup from
/// environment variables and passed into the fetcher; immutable afterwards.
#[derive(Debug, Clone)]
pub struct RakutenConfig {
    pub base_url: String,
    /// Required credential. Kept optional here so a missing value surfaces
    /// as a per-call configuration error instead of crashing the process.
    pub application_id: Option<String>,
    /// Optional credential; absence simply omits the parameter upstream.
    pub affiliate_id: Option<String>,
    pub default_genre_id: String,
    /// Page size requested upstream (Rakuten accepts up to 30).
    pub hits: u32,
    /// Minimum price floor for discount-mode search queries.
    pub min_price: u32,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: i64,
    /// When set, items without an affiliate link are dropped before display.
    pub affiliate_only: bool,
    pub bind_addr: String,
    pub initial_page_size: usize,
    pub page_increment: usize,
}

impl RakutenConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = RakutenConfig::default();

        config.application_id = read_nonempty("RAKUTEN_APP_ID");
        config.affiliate_id = read_nonempty("RAKUTEN_AFFILIATE_ID");

        if let Some(genre) = read_nonempty("RANKING_DEFAULT_GENRE") {
            config.default_genre_id = genre;
        }
        if let Some(addr) = read_nonempty("RANKING_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(min_price) = read_parsed("RANKING_MIN_PRICE")? {
            config.min_price = min_price;
        }
        if let Some(ttl) = read_parsed("RANKING_CACHE_TTL_SECS")? {
            config.cache_ttl_secs = ttl;
        }
        if let Some(flag) = read_nonempty("RANKING_AFFILIATE_ONLY") {
            config.affiliate_only = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    pub fn has_application_id(&self) -> bool {
        self.application_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Resolve a user-supplied genre id, falling back to the default when
    /// unset or empty.
    pub fn resolve_genre<'a>(&'a self, raw: Option<&'a str>) -> &'a str {
        match raw {
            Some(genre) if !genre.is_empty() => genre,
            _ => &self.default_genre_id,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.has_application_id() {
            return Err(anyhow::anyhow!(
                "RAKUTEN_APP_ID is not set; upstream calls will be rejected"
            ));
        }
        if self.hits == 0 || self.hits > 30 {
            return Err(anyhow::anyhow!("hits must be between 1 and 30"));
        }
        if self.initial_page_size == 0 || self.page_increment == 0 {
            return Err(anyhow::anyhow!("page sizes must be non-zero"));
        }
        Ok(())
    }
}

impl Default for RakutenConfig {
    fn default() -> Self {
        RakutenConfig {
            base_url: "https://app.rakuten.co.jp/services/api".to_string(),
            application_id: None,
            affiliate_id: None,
            default_genre_id: DEFAULT_GENRE_ID.to_string(),
            hits: 30,
            min_price: 1000,
            request_timeout_secs: 10,
            cache_ttl_secs: 300,
            affiliate_only: false,
            bind_addr: "127.0.0.1:3000".to_string(),
            initial_page_size: 10,
            page_increment: 10,
        }
    }
}

fn read_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn read_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match read_nonempty(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", name, e)),
        None => Ok(None),
    }
}
