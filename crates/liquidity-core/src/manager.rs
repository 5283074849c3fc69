//! Declarative swap manager.
//!
//! Swaps move through `Pending -> Executing -> {Executed | Pending}`.
//! Executed swaps leave the pending set; a failed or timed-out execution
//! puts the swap back to `Pending`, where it can be executed again without
//! its trade being counted twice. There is no automatic retry and no expiry.

use dashmap::DashMap;
use liquidity_config::ExecutionConfig;
use liquidity_pricing::SpreadResolver;
use liquidity_toxicity::{NoopPatternDetector, PatternDetector};
use liquidity_types::{
	now_millis, truncate_id, DeclarativeSwap, ExecutionOutcome, LiquidityError, Result, SwapEvent,
	SwapId, SwapIntent, SwapPriority, SwapState, ToxicityMetrics, TradeData, WalletAddress,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{EventBus, ExecutionRequest, SwapExecutor};

struct TrackedSwap {
	swap: DeclarativeSwap,
	state: SwapState,
	/// Wallet whose metrics already include this swap's trade.
	recorded_for: Option<WalletAddress>,
}

/// Creates, tracks and executes declarative swaps.
pub struct DeclarativeSwapManager {
	swaps: DashMap<SwapId, TrackedSwap>,
	resolver: Arc<SpreadResolver>,
	executor: Arc<dyn SwapExecutor>,
	detector: Arc<dyn PatternDetector>,
	events: EventBus,
	timeout: Duration,
}

impl DeclarativeSwapManager {
	pub fn new(
		resolver: Arc<SpreadResolver>,
		executor: Arc<dyn SwapExecutor>,
		config: &ExecutionConfig,
	) -> Self {
		Self {
			swaps: DashMap::new(),
			resolver,
			executor,
			detector: Arc::new(NoopPatternDetector),
			events: EventBus::default(),
			timeout: config.timeout(),
		}
	}

	pub fn with_detector(mut self, detector: Arc<dyn PatternDetector>) -> Self {
		self.detector = detector;
		self
	}

	pub fn with_event_bus(mut self, events: EventBus) -> Self {
		self.events = events;
		self
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}

	/// Create a pending swap. `priority` defaults to medium.
	///
	/// Inputs are stored as given; amounts and token symbols are the
	/// caller's to validate.
	pub fn create(
		&self,
		from_token: impl Into<String>,
		to_token: impl Into<String>,
		amount: f64,
		max_slippage: f64,
		intent: SwapIntent,
		priority: impl Into<Option<SwapPriority>>,
	) -> DeclarativeSwap {
		let swap = DeclarativeSwap {
			id: SwapId::generate(),
			from_token: from_token.into(),
			to_token: to_token.into(),
			amount,
			max_slippage,
			intent,
			priority: priority.into().unwrap_or_default(),
			timestamp: now_millis(),
		};

		self.swaps.insert(
			swap.id.clone(),
			TrackedSwap {
				swap: swap.clone(),
				state: SwapState::Pending,
				recorded_for: None,
			},
		);

		info!(
			swap_id = %swap.id,
			intent = %swap.intent,
			priority = %swap.priority,
			"Created swap {} -> {} for {}",
			swap.from_token,
			swap.to_token,
			swap.amount
		);
		self.events.publish(SwapEvent::Created(swap.clone())).ok();

		swap
	}

	/// Execute a pending swap on behalf of `wallet`.
	///
	/// The wallet's metrics are updated before the spread is computed, so
	/// this trade contributes to its own pricing. A swap's trade is recorded
	/// once per wallet; retrying a failed swap reprices it from the wallet's
	/// current metrics without counting another trade.
	///
	/// Errors never escape: unknown ids, concurrent executions, executor
	/// failures and timeouts are all reported as unsuccessful outcomes.
	pub async fn execute(&self, swap_id: &SwapId, wallet: &str) -> ExecutionOutcome {
		let (swap, already_recorded) = match self.begin(swap_id, wallet) {
			Ok(begun) => begun,
			Err(e) => {
				warn!(swap_id = %swap_id, wallet = %wallet, "Cannot execute swap: {}", e);
				return ExecutionOutcome::failed(e);
			}
		};

		let guard = ExecutionGuard {
			swaps: &self.swaps,
			swap_id,
			armed: true,
		};

		match self.price_and_execute(&swap, wallet, already_recorded).await {
			Ok((tx_hash, spread)) => {
				guard.complete();
				info!(
					swap_id = %swap_id,
					wallet = %wallet,
					tx_hash = %truncate_id(&tx_hash),
					"Swap executed"
				);
				self.events
					.publish(SwapEvent::Executed {
						swap_id: swap_id.clone(),
						wallet: wallet.to_string(),
						spread,
						tx_hash: tx_hash.clone(),
					})
					.ok();
				ExecutionOutcome::executed(tx_hash)
			}
			Err(e) => {
				drop(guard);
				warn!(swap_id = %swap_id, wallet = %wallet, "Swap execution failed: {}", e);
				let error = match &e {
					LiquidityError::Execution(message) => message.clone(),
					other => other.to_string(),
				};
				self.events
					.publish(SwapEvent::Failed {
						swap_id: swap_id.clone(),
						wallet: wallet.to_string(),
						error: error.clone(),
					})
					.ok();
				ExecutionOutcome::failed(error)
			}
		}
	}

	/// Moves a pending swap to `Executing`. Returns a copy of it and whether
	/// its trade is already recorded for `wallet`.
	fn begin(&self, swap_id: &SwapId, wallet: &str) -> Result<(DeclarativeSwap, bool)> {
		let mut tracked = self
			.swaps
			.get_mut(swap_id)
			.ok_or_else(|| LiquidityError::NotFound(swap_id.to_string()))?;

		if tracked.state == SwapState::Executing {
			return Err(LiquidityError::AlreadyExecuting(swap_id.to_string()));
		}
		tracked.state = SwapState::Executing;
		let already_recorded = tracked.recorded_for.as_deref() == Some(wallet);
		Ok((tracked.swap.clone(), already_recorded))
	}

	fn mark_recorded(&self, swap_id: &SwapId, wallet: &str) {
		if let Some(mut tracked) = self.swaps.get_mut(swap_id) {
			tracked.recorded_for = Some(wallet.to_string());
		}
	}

	/// Records the swap's trade and any detected patterns, or on a retry
	/// returns the wallet's metrics as they stand.
	async fn trade_metrics(
		&self,
		swap: &DeclarativeSwap,
		wallet: &str,
		already_recorded: bool,
	) -> Result<ToxicityMetrics> {
		let store = self.resolver.store();

		if already_recorded {
			// None if the wallet was evicted in the meantime
			if let Some(metrics) = store.get_metrics(wallet) {
				debug!(swap_id = %swap.id, wallet = %wallet, "Repricing retried swap");
				return Ok(metrics);
			}
		}

		let trade = TradeData {
			trade_size: swap.amount,
			timestamp: swap.timestamp,
			intent: swap.intent,
		};
		let mut metrics = store.record_trade(wallet, &trade);
		self.mark_recorded(&swap.id, wallet);

		for pattern in self.detector.inspect(swap, &metrics).await {
			metrics = store.record_pattern(wallet, pattern)?;
		}
		Ok(metrics)
	}

	async fn price_and_execute(
		&self,
		swap: &DeclarativeSwap,
		wallet: &str,
		already_recorded: bool,
	) -> Result<(String, f64)> {
		let metrics = self.trade_metrics(swap, wallet, already_recorded).await?;

		let toxicity = self.resolver.store().score_of(&metrics);
		let base_spread = self.resolver.config().base_spread;
		let spread = self
			.resolver
			.spread_for_score(toxicity, base_spread, swap.amount);
		debug!(swap_id = %swap.id, wallet = %wallet, toxicity, spread, "Priced swap");

		let request = ExecutionRequest {
			swap: swap.clone(),
			wallet: wallet.to_string(),
			spread,
		};

		let tx_hash = tokio::time::timeout(self.timeout, self.executor.execute(&request))
			.await
			.map_err(|_| LiquidityError::Timeout {
				after_ms: self.timeout.as_millis() as u64,
			})??;

		Ok((tx_hash, spread))
	}

	pub fn get_swap(&self, swap_id: &SwapId) -> Option<DeclarativeSwap> {
		self.swaps.get(swap_id).map(|tracked| tracked.swap.clone())
	}

	pub fn swap_state(&self, swap_id: &SwapId) -> Option<SwapState> {
		self.swaps.get(swap_id).map(|tracked| tracked.state)
	}

	/// Swaps not yet executed, oldest first.
	pub fn pending_swaps(&self) -> Vec<DeclarativeSwap> {
		let mut swaps: Vec<DeclarativeSwap> = self
			.swaps
			.iter()
			.map(|tracked| tracked.swap.clone())
			.collect();
		swaps.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
		swaps
	}

	pub fn pending_count(&self) -> usize {
		self.swaps.len()
	}
}

/// Returns an executing swap to `Pending` unless completed, including when
/// the `execute` future is dropped mid-flight.
struct ExecutionGuard<'a> {
	swaps: &'a DashMap<SwapId, TrackedSwap>,
	swap_id: &'a SwapId,
	armed: bool,
}

impl ExecutionGuard<'_> {
	fn complete(mut self) {
		self.armed = false;
		self.swaps.remove(self.swap_id);
	}
}

impl Drop for ExecutionGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			if let Some(mut tracked) = self.swaps.get_mut(self.swap_id) {
				tracked.state = SwapState::Pending;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::SimulatedExecutor;
	use liquidity_config::PricingConfig;
	use liquidity_pricing::SegmentRegistry;
	use liquidity_toxicity::ToxicityMetricsStore;

	fn manager() -> DeclarativeSwapManager {
		let resolver = Arc::new(SpreadResolver::new(
			Arc::new(ToxicityMetricsStore::default()),
			Arc::new(SegmentRegistry::with_defaults()),
			PricingConfig::default(),
		));
		DeclarativeSwapManager::new(
			resolver,
			Arc::new(SimulatedExecutor::default()),
			&ExecutionConfig::default(),
		)
	}

	#[test]
	fn test_create_stores_pending_swap() {
		let manager = manager();
		let swap = manager.create("SOL", "USDC", 100.0, 0.005, SwapIntent::Retail, None);

		assert_eq!(swap.priority, SwapPriority::Medium);
		assert_eq!(manager.get_swap(&swap.id), Some(swap.clone()));
		assert_eq!(manager.swap_state(&swap.id), Some(SwapState::Pending));
		assert_eq!(manager.pending_count(), 1);
	}

	#[test]
	fn test_create_does_not_validate_amount() {
		let manager = manager();
		let swap = manager.create("SOL", "USDC", -5.0, 0.005, SwapIntent::Retail, SwapPriority::High);
		assert_eq!(swap.amount, -5.0);
		assert_eq!(swap.priority, SwapPriority::High);
	}

	#[tokio::test]
	async fn test_execute_removes_swap() {
		let manager = manager();
		let swap = manager.create("SOL", "USDC", 100.0, 0.005, SwapIntent::Retail, None);

		let outcome = manager.execute(&swap.id, "W1").await;
		assert!(outcome.success);
		assert!(outcome.tx_hash.is_some());
		assert!(outcome.error.is_none());
		assert!(manager.get_swap(&swap.id).is_none());

		// A second execution finds nothing
		let outcome = manager.execute(&swap.id, "W1").await;
		assert_eq!(outcome.error.as_deref(), Some("Swap not found"));
	}

	#[tokio::test]
	async fn test_rejected_route_stays_pending() {
		let manager = manager();
		let swap = manager.create("SOL", "SOL", 100.0, 0.005, SwapIntent::Retail, None);

		let outcome = manager.execute(&swap.id, "W1").await;
		assert!(!outcome.success);
		assert_eq!(outcome.error.as_deref(), Some("No route from SOL to itself"));
		assert_eq!(manager.swap_state(&swap.id), Some(SwapState::Pending));
	}

	#[test]
	fn test_pending_swaps_sorted_by_creation() {
		let manager = manager();
		let first = manager.create("SOL", "USDC", 1.0, 0.005, SwapIntent::Retail, None);
		let second = manager.create("USDC", "SOL", 2.0, 0.005, SwapIntent::Institutional, None);

		let pending = manager.pending_swaps();
		assert_eq!(pending.len(), 2);
		assert!(pending[0].timestamp <= pending[1].timestamp);
		assert!(pending.iter().any(|s| s.id == first.id));
		assert!(pending.iter().any(|s| s.id == second.id));
	}
}
