//! Simulated executor used in development and tests.

use async_trait::async_trait;
use liquidity_types::{LiquidityError, Result};
use sha3::{Digest, Keccak256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

use crate::{ExecutionRequest, SwapExecutor};

/// Executor that settles nothing and fabricates a transaction hash.
///
/// Routes from a token to itself and non-positive or non-finite amounts
/// are rejected.
pub struct SimulatedExecutor {
	latency: Duration,
	nonce: AtomicU64,
}

impl SimulatedExecutor {
	pub fn new(latency: Duration) -> Self {
		Self {
			latency,
			nonce: AtomicU64::new(0),
		}
	}
}

impl Default for SimulatedExecutor {
	fn default() -> Self {
		Self::new(Duration::ZERO)
	}
}

#[async_trait]
impl SwapExecutor for SimulatedExecutor {
	async fn execute(&self, request: &ExecutionRequest) -> Result<String> {
		let swap = &request.swap;
		if swap.from_token == swap.to_token {
			return Err(LiquidityError::Execution(format!(
				"No route from {} to itself",
				swap.from_token
			)));
		}
		if !(swap.amount.is_finite() && swap.amount > 0.0) {
			return Err(LiquidityError::Execution(format!(
				"Route rejected for amount {}",
				swap.amount
			)));
		}

		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}

		info!(
			swap_id = %swap.id,
			"Executing swap with {:.2}% spread",
			request.spread * 100.0
		);

		let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
		let mut hasher = Keccak256::new();
		hasher.update(swap.id.as_str().as_bytes());
		hasher.update(request.wallet.as_bytes());
		hasher.update(request.spread.to_be_bytes());
		hasher.update(nonce.to_be_bytes());

		Ok(format!("0x{}", hex::encode(hasher.finalize())))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use liquidity_types::{DeclarativeSwap, SwapId, SwapIntent, SwapPriority};

	fn request(from: &str, to: &str, amount: f64) -> ExecutionRequest {
		ExecutionRequest {
			swap: DeclarativeSwap {
				id: SwapId::generate(),
				from_token: from.to_string(),
				to_token: to.to_string(),
				amount,
				max_slippage: 0.005,
				intent: SwapIntent::Retail,
				priority: SwapPriority::Medium,
				timestamp: 0,
			},
			wallet: "W1".to_string(),
			spread: 0.003,
		}
	}

	#[tokio::test]
	async fn test_simulated_hashes_are_unique() {
		let executor = SimulatedExecutor::default();
		let req = request("SOL", "USDC", 100.0);

		let first = executor.execute(&req).await.unwrap();
		let second = executor.execute(&req).await.unwrap();

		assert!(first.starts_with("0x"));
		assert_eq!(first.len(), 66);
		assert_ne!(first, second);
	}

	#[tokio::test]
	async fn test_simulated_rejects_bad_routes() {
		let executor = SimulatedExecutor::default();

		let same = executor.execute(&request("SOL", "SOL", 1.0)).await;
		assert!(matches!(same, Err(LiquidityError::Execution(_))));

		let zero = executor.execute(&request("SOL", "USDC", 0.0)).await;
		assert!(matches!(zero, Err(LiquidityError::Execution(_))));
	}
}
