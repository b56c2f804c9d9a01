pub mod ranking_models;

pub use ranking_models::*;
