//! Delegated swap execution.

use async_trait::async_trait;
use liquidity_types::{DeclarativeSwap, Result, WalletAddress};

/// Everything an executor needs to settle one swap.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
	pub swap: DeclarativeSwap,
	pub wallet: WalletAddress,
	/// Effective spread resolved for the wallet, as a fraction.
	pub spread: f64,
}

/// Trait defining the interface to the external quote/execution service.
///
/// Implementations return the transaction hash of the settled swap, or an
/// error if the route was rejected or settlement failed. The manager bounds
/// every call with a timeout and may drop the future, so implementations
/// must tolerate cancellation at any await point.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
	async fn execute(&self, request: &ExecutionRequest) -> Result<String>;
}
