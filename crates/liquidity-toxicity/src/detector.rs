//! Adversarial pattern detection seam.

use async_trait::async_trait;
use liquidity_types::{DeclarativeSwap, MaliciousPattern, ToxicityMetrics};

/// Inspects a swap about to be priced and reports adversarial patterns
/// attributable to the trading wallet.
///
/// Reported patterns are added to the wallet's counters before its spread
/// is computed.
#[async_trait]
pub trait PatternDetector: Send + Sync {
	async fn inspect(
		&self,
		swap: &DeclarativeSwap,
		metrics: &ToxicityMetrics,
	) -> Vec<MaliciousPattern>;
}

/// Detector that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPatternDetector;

#[async_trait]
impl PatternDetector for NoopPatternDetector {
	async fn inspect(
		&self,
		_swap: &DeclarativeSwap,
		_metrics: &ToxicityMetrics,
	) -> Vec<MaliciousPattern> {
		Vec::new()
	}
}
