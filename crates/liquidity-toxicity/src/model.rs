//! Weighted-sum toxicity model.

use liquidity_config::ToxicityConfig;
use liquidity_types::ToxicityMetrics;

use crate::ToxicityModel;

/// Scores a wallet as a weighted sum of three saturating components:
///
/// - frequency: `min(trade_frequency / frequency_norm, 1)`
/// - size: `min(avg_trade_size / size_norm, 1)`
/// - patterns: `(sandwich + frontrun) / pattern_norm + score`, where
///   `score` is the accumulated high-frequency and arbitrage flag value
///
/// The sum is clamped to [0, 1].
#[derive(Debug, Clone)]
pub struct WeightedToxicityModel {
	frequency_weight: f64,
	frequency_norm: f64,
	size_weight: f64,
	size_norm: f64,
	pattern_weight: f64,
	pattern_norm: f64,
}

impl WeightedToxicityModel {
	pub fn new(config: &ToxicityConfig) -> Self {
		Self {
			frequency_weight: config.frequency_weight,
			frequency_norm: config.frequency_norm,
			size_weight: config.size_weight,
			size_norm: config.size_norm,
			pattern_weight: config.pattern_weight,
			pattern_norm: config.pattern_norm,
		}
	}

	fn ratio(value: f64, norm: f64) -> f64 {
		if norm > 0.0 {
			value / norm
		} else {
			0.0
		}
	}
}

impl Default for WeightedToxicityModel {
	fn default() -> Self {
		Self::new(&ToxicityConfig::default())
	}
}

impl ToxicityModel for WeightedToxicityModel {
	fn evaluate(&self, metrics: &ToxicityMetrics) -> f64 {
		let frequency = Self::ratio(metrics.trade_frequency as f64, self.frequency_norm).min(1.0);
		let size = Self::ratio(metrics.avg_trade_size, self.size_norm).clamp(0.0, 1.0);
		let patterns =
			Self::ratio(metrics.malicious_attempts() as f64, self.pattern_norm) + metrics.score;

		let score = frequency * self.frequency_weight
			+ size * self.size_weight
			+ patterns * self.pattern_weight;

		if score.is_nan() {
			return 0.0;
		}
		score.clamp(0.0, 1.0)
	}
}
