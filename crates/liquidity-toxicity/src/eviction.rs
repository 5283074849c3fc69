//! Background sweep of idle wallet metrics.

use liquidity_types::now_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ToxicityMetricsStore;

/// Periodically evicts idle wallets until a shutdown signal arrives.
///
/// The first sweep runs one full `interval` after spawning.
pub fn spawn_eviction_task(
	store: Arc<ToxicityMetricsStore>,
	interval: Duration,
	mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				_ = ticker.tick() => {
					let evicted = store.evict_idle(now_millis()) + store.enforce_capacity();
					debug!(evicted, tracked = store.len(), "Eviction sweep complete");
				}
				_ = shutdown.recv() => {
					info!("Eviction task shutting down");
					break;
				}
			}
		}
	})
}
