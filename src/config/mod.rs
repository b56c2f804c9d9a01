pub mod rakuten_config;

pub use rakuten_config::*;
