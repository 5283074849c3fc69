//! Toxicity scoring for the conditional liquidity engine.
//!
//! This crate keeps per-wallet trading statistics and turns them into a
//! toxicity score in [0, 1]. Higher scores mean more adversarial or
//! high-frequency behaviour and therefore wider spreads.

use liquidity_types::ToxicityMetrics;

pub mod detector;
pub mod eviction;
pub mod model;
pub mod store;

pub use detector::{NoopPatternDetector, PatternDetector};
pub use eviction::spawn_eviction_task;
pub use model::WeightedToxicityModel;
pub use store::ToxicityMetricsStore;

/// Maps a wallet's statistics to a toxicity score.
///
/// Implementations must return a value within [0, 1] and must be pure:
/// the same metrics always produce the same score.
pub trait ToxicityModel: Send + Sync {
	fn evaluate(&self, metrics: &ToxicityMetrics) -> f64;
}
