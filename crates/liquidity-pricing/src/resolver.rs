//! Toxicity-aware spread resolution.

use liquidity_config::PricingConfig;
use liquidity_toxicity::ToxicityMetricsStore;
use std::sync::Arc;
use tracing::debug;

use crate::SegmentRegistry;

/// Computes the effective spread for a wallet from its toxicity score and
/// the best matching segment.
pub struct SpreadResolver {
	store: Arc<ToxicityMetricsStore>,
	registry: Arc<SegmentRegistry>,
	config: PricingConfig,
}

impl SpreadResolver {
	pub fn new(
		store: Arc<ToxicityMetricsStore>,
		registry: Arc<SegmentRegistry>,
		config: PricingConfig,
	) -> Self {
		Self {
			store,
			registry,
			config,
		}
	}

	/// Optimal spread for a wallet given the caller's base spread.
	pub fn optimal_spread(&self, wallet: &str, base_spread: f64, trade_size: f64) -> f64 {
		let toxicity = self.store.get_score(wallet);
		self.spread_for_score(toxicity, base_spread, trade_size)
	}

	/// Spread for an already computed toxicity score.
	///
	/// Without an admitting segment the base spread is returned unchanged.
	/// Otherwise the segment range is scaled by `1 + toxicity * factor`,
	/// which may overshoot `max_spread`; the result is then capped at
	/// `base_spread * spread_cap_multiplier`. Never negative.
	pub fn spread_for_score(&self, toxicity: f64, base_spread: f64, trade_size: f64) -> f64 {
		let Some(segment) = self.registry.best_segment(toxicity, trade_size) else {
			return base_spread.max(0.0);
		};

		let toxicity_multiplier = 1.0 + toxicity * self.config.toxicity_spread_factor;
		let segment_spread =
			segment.min_spread + (segment.max_spread - segment.min_spread) * toxicity_multiplier;
		let cap = base_spread * self.config.spread_cap_multiplier;
		let spread = segment_spread.min(cap).max(0.0);

		debug!(
			toxicity,
			segment = %segment.id,
			segment_spread,
			cap,
			spread,
			"Resolved spread"
		);
		spread
	}

	pub fn store(&self) -> &Arc<ToxicityMetricsStore> {
		&self.store
	}

	pub fn registry(&self) -> &Arc<SegmentRegistry> {
		&self.registry
	}

	pub fn config(&self) -> &PricingConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use liquidity_types::{LiquiditySegment, Segmenter, SwapIntent, TradeData};

	const EPS: f64 = 1e-12;

	fn resolver() -> SpreadResolver {
		SpreadResolver::new(
			Arc::new(ToxicityMetricsStore::default()),
			Arc::new(SegmentRegistry::with_defaults()),
			PricingConfig::default(),
		)
	}

	#[test]
	fn test_unseen_wallet_uses_retail_segment() {
		let resolver = resolver();
		// 0.002 + (0.003 - 0.002) * 1.0
		let spread = resolver.optimal_spread("unseen", 0.003, 100.0);
		assert!((spread - 0.003).abs() < EPS);

		// Capped by a narrow base spread
		let spread = resolver.optimal_spread("unseen", 0.002, 100.0);
		assert!((spread - 0.0024).abs() < EPS);
	}

	#[test]
	fn test_spread_never_exceeds_cap() {
		let resolver = resolver();
		let bases = [0.0001, 0.001, 0.003, 0.01, 0.5];
		for step in 0..=100 {
			let toxicity = step as f64 / 100.0;
			for base in bases {
				let spread = resolver.spread_for_score(toxicity, base, 1.0);
				assert!(spread <= 1.2 * base + EPS, "t={} b={}", toxicity, base);
				assert!(spread >= 0.0);
			}
		}
	}

	#[test]
	fn test_no_segment_returns_base() {
		let resolver = resolver();
		assert_eq!(resolver.spread_for_score(0.9, 0.003, 1.0), 0.003);

		let empty = SpreadResolver::new(
			Arc::new(ToxicityMetricsStore::default()),
			Arc::new(SegmentRegistry::new()),
			PricingConfig::default(),
		);
		assert_eq!(empty.optimal_spread("W1", 0.004, 1.0), 0.004);
	}

	#[test]
	fn test_toxicity_headroom_above_max_spread() {
		let registry = SegmentRegistry::from_segmenters(vec![Segmenter {
			id: "wide".to_string(),
			name: "Wide".to_string(),
			segments: vec![LiquiditySegment::new("w", "W", 0.002, 0.004, 1.0, 1)],
			is_active: true,
		}])
		.unwrap();
		let resolver = SpreadResolver::new(
			Arc::new(ToxicityMetricsStore::default()),
			Arc::new(registry),
			PricingConfig::default(),
		);

		// multiplier 1.5 -> 0.002 + 0.002 * 1.5 = 0.005, above max_spread
		let spread = resolver.spread_for_score(1.0, 1.0, 1.0);
		assert!((spread - 0.005).abs() < EPS);
	}

	#[test]
	fn test_spread_reflects_recorded_trades() {
		let resolver = resolver();
		resolver.store().record_trade(
			"W1",
			&TradeData {
				trade_size: 100.0,
				timestamp: 0,
				intent: SwapIntent::Retail,
			},
		);

		// toxicity 0.023 -> multiplier 1.0115
		let spread = resolver.optimal_spread("W1", 0.003, 100.0);
		assert!((spread - (0.002 + 0.001 * 1.0115)).abs() < EPS);
	}
}
