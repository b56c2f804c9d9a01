pub mod fetch_error;
pub mod ranking_fetcher;

pub use fetch_error::FetchError;
pub use ranking_fetcher::{RankingFetcher, RankingSource};
