pub mod discount;
pub mod normalizer;
pub mod service;
pub mod view;

pub use normalizer::RankingNormalizer;
pub use service::RankingService;
pub use view::{RankingView, ViewPhase, ViewTicket};
