//! Engine assembly and lifecycle.

use liquidity_config::LiquidityConfig;
use liquidity_pricing::{SegmentRegistry, SpreadResolver};
use liquidity_toxicity::{spawn_eviction_task, PatternDetector, ToxicityMetricsStore, ToxicityModel};
use liquidity_types::{
	DeclarativeSwap, ExecutionOutcome, Result, SwapId, SwapIntent, SwapPriority, ToxicityMetrics,
};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

use crate::{DeclarativeSwapManager, EventBus, SimulatedExecutor, SwapExecutor};

/// Builder for [`LiquidityEngine`].
///
/// Anything not supplied falls back to the configured or default
/// implementation: the weighted toxicity model, the no-op pattern detector
/// and the simulated executor.
#[derive(Default)]
pub struct LiquidityEngineBuilder {
	config: Option<LiquidityConfig>,
	executor: Option<Arc<dyn SwapExecutor>>,
	detector: Option<Arc<dyn PatternDetector>>,
	model: Option<Arc<dyn ToxicityModel>>,
}

impl LiquidityEngineBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(mut self, config: LiquidityConfig) -> Self {
		self.config = Some(config);
		self
	}

	pub fn with_executor(mut self, executor: Arc<dyn SwapExecutor>) -> Self {
		self.executor = Some(executor);
		self
	}

	pub fn with_detector(mut self, detector: Arc<dyn PatternDetector>) -> Self {
		self.detector = Some(detector);
		self
	}

	pub fn with_model(mut self, model: Arc<dyn ToxicityModel>) -> Self {
		self.model = Some(model);
		self
	}

	/// Build the engine. Fails if a configured segmenter is invalid.
	pub fn build(self) -> Result<LiquidityEngine> {
		let config = self.config.unwrap_or_default();

		let store = Arc::new(match self.model {
			Some(model) => ToxicityMetricsStore::with_model(config.toxicity.clone(), model),
			None => ToxicityMetricsStore::new(config.toxicity.clone()),
		});
		let registry = Arc::new(SegmentRegistry::from_segmenters(
			config.segmenters_or_default(),
		)?);
		let resolver = Arc::new(SpreadResolver::new(
			store.clone(),
			registry.clone(),
			config.pricing.clone(),
		));

		let executor: Arc<dyn SwapExecutor> = match self.executor {
			Some(executor) => executor,
			None => Arc::new(SimulatedExecutor::new(config.execution.simulated_latency())),
		};
		let events = EventBus::default();

		let mut manager = DeclarativeSwapManager::new(resolver.clone(), executor, &config.execution)
			.with_event_bus(events.clone());
		if let Some(detector) = self.detector {
			manager = manager.with_detector(detector);
		}

		let (shutdown_tx, _) = broadcast::channel(4);

		info!(
			"Built liquidity engine {} with {} segmenters",
			config.service.name,
			registry.segmenters().len()
		);

		Ok(LiquidityEngine {
			config,
			store,
			registry,
			resolver,
			manager: Arc::new(manager),
			events,
			shutdown_tx,
			tasks: Mutex::new(Vec::new()),
		})
	}
}

/// A fully wired conditional liquidity engine.
pub struct LiquidityEngine {
	config: LiquidityConfig,
	store: Arc<ToxicityMetricsStore>,
	registry: Arc<SegmentRegistry>,
	resolver: Arc<SpreadResolver>,
	manager: Arc<DeclarativeSwapManager>,
	events: EventBus,
	shutdown_tx: broadcast::Sender<()>,
	tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl LiquidityEngine {
	pub fn builder() -> LiquidityEngineBuilder {
		LiquidityEngineBuilder::new()
	}

	/// Start background work. The eviction sweep only runs when an idle or
	/// capacity limit is configured.
	pub async fn start(&self) {
		let toxicity = &self.config.toxicity;
		if toxicity.max_idle_secs.is_none() && toxicity.max_wallets.is_none() {
			info!("Wallet eviction disabled");
			return;
		}

		let handle = spawn_eviction_task(
			self.store.clone(),
			toxicity.eviction_interval(),
			self.shutdown_tx.subscribe(),
		);
		self.tasks.lock().await.push(handle);
		info!(
			"Wallet eviction enabled every {:?}",
			toxicity.eviction_interval()
		);
	}

	/// Signal background tasks to stop and wait for them.
	pub async fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());
		let handles: Vec<_> = self.tasks.lock().await.drain(..).collect();
		for handle in handles {
			let _ = handle.await;
		}
		info!("Liquidity engine stopped");
	}

	pub fn create_swap(
		&self,
		from_token: impl Into<String>,
		to_token: impl Into<String>,
		amount: f64,
		max_slippage: f64,
		intent: SwapIntent,
		priority: impl Into<Option<SwapPriority>>,
	) -> DeclarativeSwap {
		self.manager
			.create(from_token, to_token, amount, max_slippage, intent, priority)
	}

	pub async fn execute_swap(&self, swap_id: &SwapId, wallet: &str) -> ExecutionOutcome {
		self.manager.execute(swap_id, wallet).await
	}

	pub fn get_score(&self, wallet: &str) -> f64 {
		self.store.get_score(wallet)
	}

	pub fn get_metrics(&self, wallet: &str) -> Option<ToxicityMetrics> {
		self.store.get_metrics(wallet)
	}

	pub fn optimal_spread(&self, wallet: &str, base_spread: f64, trade_size: f64) -> f64 {
		self.resolver.optimal_spread(wallet, base_spread, trade_size)
	}

	pub fn config(&self) -> &LiquidityConfig {
		&self.config
	}

	pub fn store(&self) -> &Arc<ToxicityMetricsStore> {
		&self.store
	}

	pub fn registry(&self) -> &Arc<SegmentRegistry> {
		&self.registry
	}

	pub fn resolver(&self) -> &Arc<SpreadResolver> {
		&self.resolver
	}

	pub fn manager(&self) -> &Arc<DeclarativeSwapManager> {
		&self.manager
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use liquidity_types::{LiquiditySegment, Segmenter, SwapEvent};

	#[tokio::test]
	async fn test_build_with_defaults() {
		let engine = LiquidityEngine::builder().build().unwrap();
		assert_eq!(engine.registry().segmenters().len(), 1);
		assert_eq!(engine.get_score("nobody"), 0.0);

		engine.start().await;
		engine.shutdown().await;
	}

	#[test]
	fn test_build_rejects_invalid_segmenter() {
		let mut config = LiquidityConfig::default();
		config.segmenters.push(Segmenter {
			id: "bad".to_string(),
			name: "Bad".to_string(),
			segments: vec![LiquiditySegment::new("x", "X", 0.0, 0.001, 0.5, 1)],
			is_active: true,
		});

		assert!(LiquidityEngine::builder().with_config(config).build().is_err());
	}

	#[tokio::test]
	async fn test_events_follow_swap_lifecycle() {
		let engine = LiquidityEngine::builder().build().unwrap();
		let mut events = engine.events().subscribe();

		let swap = engine.create_swap("SOL", "USDC", 100.0, 0.005, SwapIntent::Retail, None);
		let outcome = engine.execute_swap(&swap.id, "W1").await;
		assert!(outcome.success);

		match events.recv().await.unwrap() {
			SwapEvent::Created(created) => assert_eq!(created.id, swap.id),
			other => panic!("unexpected event {:?}", other),
		}
		match events.recv().await.unwrap() {
			SwapEvent::Executed { swap_id, tx_hash, .. } => {
				assert_eq!(swap_id, swap.id);
				assert_eq!(Some(tx_hash), outcome.tx_hash);
			}
			other => panic!("unexpected event {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_eviction_task_lifecycle() {
		let mut config = LiquidityConfig::default();
		config.toxicity.max_wallets = Some(10);

		let engine = LiquidityEngine::builder().with_config(config).build().unwrap();
		engine.start().await;
		assert_eq!(engine.tasks.lock().await.len(), 1);

		engine.shutdown().await;
		assert!(engine.tasks.lock().await.is_empty());
	}
}
