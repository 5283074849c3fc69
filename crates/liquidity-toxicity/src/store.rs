//! Per-wallet toxicity metrics store.

use dashmap::{mapref::entry::Entry, DashMap};
use liquidity_config::ToxicityConfig;
use liquidity_types::{
	now_millis, LiquidityError, MaliciousPattern, Result, SwapIntent, Timestamp, ToxicityMetrics,
	TradeData, WalletAddress,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{ToxicityModel, WeightedToxicityModel};

/// Holds trading statistics for every wallet seen so far.
///
/// Each update for a wallet runs entirely under that wallet's map entry
/// lock, so concurrent trades for the same wallet never interleave their
/// read-modify-write. Updates for different wallets proceed in parallel.
pub struct ToxicityMetricsStore {
	metrics: DashMap<WalletAddress, ToxicityMetrics>,
	model: Arc<dyn ToxicityModel>,
	config: ToxicityConfig,
}

impl ToxicityMetricsStore {
	/// Creates a store scored by the [`WeightedToxicityModel`].
	pub fn new(config: ToxicityConfig) -> Self {
		let model = Arc::new(WeightedToxicityModel::new(&config));
		Self::with_model(config, model)
	}

	pub fn with_model(config: ToxicityConfig, model: Arc<dyn ToxicityModel>) -> Self {
		Self {
			metrics: DashMap::new(),
			model,
			config,
		}
	}

	/// Records a trade and returns the wallet's updated metrics.
	///
	/// The first trade creates the record. Later trades bump the trade
	/// count, fold the size into the two-point running average and move
	/// `last_trade_time` to the trade's timestamp. A trade arriving within
	/// the high-frequency window of the previous one raises the flag score,
	/// as does arbitrage intent. The flag score is capped at 1.
	///
	/// The record is stamped with the current wall-clock time for eviction,
	/// independently of the trade's own timestamp.
	pub fn record_trade(&self, wallet: &str, trade: &TradeData) -> ToxicityMetrics {
		self.record_trade_at(wallet, trade, now_millis())
	}

	/// [`record_trade`](Self::record_trade) with an explicit recording time.
	pub fn record_trade_at(
		&self,
		wallet: &str,
		trade: &TradeData,
		recorded_at: Timestamp,
	) -> ToxicityMetrics {
		let (snapshot, created) = match self.metrics.entry(wallet.to_string()) {
			Entry::Occupied(mut entry) => {
				let metrics = entry.get_mut();
				let high_frequency =
					trade.timestamp < metrics.last_trade_time.saturating_add(self.config.hft_window_ms);

				metrics.trade_frequency = metrics.trade_frequency.saturating_add(1);
				metrics.avg_trade_size = (metrics.avg_trade_size + trade.trade_size) / 2.0;
				metrics.last_trade_time = trade.timestamp;
				metrics.recorded_at = metrics.recorded_at.max(recorded_at);

				if high_frequency {
					debug!(wallet = %wallet, "High-frequency trade detected");
					metrics.score = (metrics.score + self.config.hft_penalty).min(1.0);
				}
				self.apply_intent_flag(metrics, trade.intent);

				(metrics.clone(), false)
			}
			Entry::Vacant(entry) => {
				let mut metrics = ToxicityMetrics::first_trade(wallet, trade, recorded_at);
				self.apply_intent_flag(&mut metrics, trade.intent);
				entry.insert(metrics.clone());
				(metrics, true)
			}
		};

		debug!(
			wallet = %wallet,
			trade_frequency = snapshot.trade_frequency,
			avg_trade_size = snapshot.avg_trade_size,
			flag_score = snapshot.score,
			"Recorded trade"
		);

		if created {
			self.enforce_capacity_excluding(Some(wallet));
		}

		snapshot
	}

	fn apply_intent_flag(&self, metrics: &mut ToxicityMetrics, intent: SwapIntent) {
		if intent == SwapIntent::Arbitrage {
			metrics.score = (metrics.score + self.config.arbitrage_penalty).min(1.0);
		}
	}

	/// Attributes a detected adversarial pattern to a wallet.
	///
	/// Only wallets that have traded can be flagged.
	pub fn record_pattern(&self, wallet: &str, pattern: MaliciousPattern) -> Result<ToxicityMetrics> {
		let mut metrics = self
			.metrics
			.get_mut(wallet)
			.ok_or_else(|| LiquidityError::UnknownWallet(wallet.to_string()))?;

		match pattern {
			MaliciousPattern::Sandwich => {
				metrics.sandwich_attempts = metrics.sandwich_attempts.saturating_add(1)
			}
			MaliciousPattern::Frontrun => {
				metrics.frontrun_attempts = metrics.frontrun_attempts.saturating_add(1)
			}
		}

		info!(wallet = %wallet, pattern = %pattern, "Recorded malicious pattern");
		Ok(metrics.clone())
	}

	/// Toxicity score of a wallet; unseen wallets score 0.
	pub fn get_score(&self, wallet: &str) -> f64 {
		self.metrics
			.get(wallet)
			.map(|metrics| self.model.evaluate(&metrics))
			.unwrap_or(0.0)
	}

	/// Scores an already captured metrics snapshot.
	pub fn score_of(&self, metrics: &ToxicityMetrics) -> f64 {
		self.model.evaluate(metrics)
	}

	pub fn get_metrics(&self, wallet: &str) -> Option<ToxicityMetrics> {
		self.metrics.get(wallet).map(|entry| entry.value().clone())
	}

	pub fn len(&self) -> usize {
		self.metrics.len()
	}

	pub fn is_empty(&self) -> bool {
		self.metrics.is_empty()
	}

	/// Removes wallets with no trade recorded within `max_idle_secs` of
	/// `now`, measured on the wall-clock recording time.
	///
	/// Returns the number of evicted wallets; does nothing when no idle
	/// limit is configured.
	pub fn evict_idle(&self, now: Timestamp) -> usize {
		let Some(max_idle) = self.config.max_idle() else {
			return 0;
		};
		let max_idle_ms = max_idle.as_millis() as u64;

		let mut evicted = 0;
		self.metrics.retain(|_, metrics| {
			let keep = now.saturating_sub(metrics.recorded_at) <= max_idle_ms;
			if !keep {
				evicted += 1;
			}
			keep
		});

		if evicted > 0 {
			info!("Evicted {} idle wallets", evicted);
		}
		evicted
	}

	/// Evicts the least recently recorded wallets above `max_wallets`.
	pub fn enforce_capacity(&self) -> usize {
		self.enforce_capacity_excluding(None)
	}

	fn enforce_capacity_excluding(&self, keep: Option<&str>) -> usize {
		let Some(max_wallets) = self.config.max_wallets else {
			return 0;
		};
		// One linear scan per surplus wallet; recording a new wallet at
		// capacity leaves a surplus of one.
		let mut evicted = 0;
		while self.metrics.len() > max_wallets {
			let oldest = self
				.metrics
				.iter()
				.filter(|entry| Some(entry.key().as_str()) != keep)
				.min_by_key(|entry| entry.recorded_at)
				.map(|entry| entry.key().clone());

			let Some(wallet) = oldest else {
				break;
			};
			if self.metrics.remove(&wallet).is_some() {
				evicted += 1;
			}
		}

		if evicted > 0 {
			info!("Evicted {} wallets over capacity {}", evicted, max_wallets);
		}
		evicted
	}
}

impl Default for ToxicityMetricsStore {
	fn default() -> Self {
		Self::new(ToxicityConfig::default())
	}
}
