//! Configuration types for the liquidity engine.

use liquidity_types::Segmenter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LiquidityConfig {
	/// Service identity and logging
	pub service: ServiceSettings,
	/// Toxicity model weights and flag penalties
	pub toxicity: ToxicityConfig,
	/// Spread computation parameters
	pub pricing: PricingConfig,
	/// Delegated execution settings
	pub execution: ExecutionConfig,
	/// Segmenters registered at startup
	pub segmenters: Vec<Segmenter>,
}

/// Service identity and logging
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
	/// Service name for logging
	pub name: String,
	/// Default log filter when `RUST_LOG` is not set
	pub log_level: String,
}

impl Default for ServiceSettings {
	fn default() -> Self {
		Self {
			name: "liquidity-engine".to_string(),
			log_level: "info".to_string(),
		}
	}
}

/// Toxicity scoring parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToxicityConfig {
	/// Weight of the trade-frequency component
	pub frequency_weight: f64,
	/// Trade count at which the frequency component saturates
	pub frequency_norm: f64,
	/// Weight of the average-size component
	pub size_weight: f64,
	/// Average notional at which the size component saturates
	pub size_norm: f64,
	/// Weight of the malicious-pattern component
	pub pattern_weight: f64,
	/// Detected attempts that count as one full unit of the pattern component
	pub pattern_norm: f64,
	/// Trades closer together than this are flagged as high-frequency
	pub hft_window_ms: u64,
	/// Flag increment for a high-frequency trade
	pub hft_penalty: f64,
	/// Flag increment for a trade declared with arbitrage intent
	pub arbitrage_penalty: f64,
	/// Wallets idle for longer than this are evicted (disabled when unset)
	pub max_idle_secs: Option<u64>,
	/// Upper bound on tracked wallets (disabled when unset)
	pub max_wallets: Option<usize>,
	/// How often the idle sweep runs
	pub eviction_interval_secs: u64,
}

impl Default for ToxicityConfig {
	fn default() -> Self {
		Self {
			frequency_weight: 0.3,
			frequency_norm: 100.0,
			size_weight: 0.2,
			size_norm: 1000.0,
			pattern_weight: 0.5,
			pattern_norm: 10.0,
			hft_window_ms: 1000,
			hft_penalty: 0.1,
			arbitrage_penalty: 0.2,
			max_idle_secs: None,
			max_wallets: None,
			eviction_interval_secs: 60,
		}
	}
}

impl ToxicityConfig {
	pub fn max_idle(&self) -> Option<Duration> {
		self.max_idle_secs.map(Duration::from_secs)
	}

	pub fn eviction_interval(&self) -> Duration {
		Duration::from_secs(self.eviction_interval_secs.max(1))
	}
}

/// Spread computation parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingConfig {
	/// Base spread applied by `execute` (0.003 = 0.3%)
	pub base_spread: f64,
	/// Final spread never exceeds `base_spread * spread_cap_multiplier`
	pub spread_cap_multiplier: f64,
	/// Toxicity multiplier is `1 + toxicity * toxicity_spread_factor`
	pub toxicity_spread_factor: f64,
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			base_spread: 0.003,
			spread_cap_multiplier: 1.2,
			toxicity_spread_factor: 0.5,
		}
	}
}

/// Delegated execution settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
	/// Upper bound on a single delegated execution
	pub timeout_ms: u64,
	/// Artificial latency of the simulated executor
	pub simulated_latency_ms: u64,
}

impl Default for ExecutionConfig {
	fn default() -> Self {
		Self {
			timeout_ms: 5000,
			simulated_latency_ms: 0,
		}
	}
}

impl ExecutionConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	pub fn simulated_latency(&self) -> Duration {
		Duration::from_millis(self.simulated_latency_ms)
	}
}

impl LiquidityConfig {
	/// Configured segmenters, or the default aggregator when none are given.
	pub fn segmenters_or_default(&self) -> Vec<Segmenter> {
		if self.segmenters.is_empty() {
			vec![Segmenter::aggregator()]
		} else {
			self.segmenters.clone()
		}
	}
}
