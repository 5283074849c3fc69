//! Per-wallet trading statistics used to discriminate spreads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{SwapIntent, Timestamp, WalletAddress};

/// Running trading statistics for one wallet.
///
/// A record is created lazily on the wallet's first trade and is only ever
/// updated in place afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicityMetrics {
	pub wallet_address: WalletAddress,
	/// Accumulated behaviour flags in [0, 1]: high-frequency trading and
	/// arbitrage intent. Never decreases. Feeds the malicious-pattern
	/// component of the derived toxicity score.
	pub score: f64,
	/// Timestamp of the latest trade as declared by the swap. Drives the
	/// high-frequency check.
	pub last_trade_time: Timestamp,
	/// Wall-clock time the latest trade was recorded. Drives idle and
	/// capacity eviction.
	#[serde(default)]
	pub recorded_at: Timestamp,
	/// Cumulative trade count.
	pub trade_frequency: u64,
	/// Two-point running average of trade notional:
	/// `(previous_avg + trade_size) / 2`.
	pub avg_trade_size: f64,
	pub sandwich_attempts: u32,
	pub frontrun_attempts: u32,
}

impl ToxicityMetrics {
	/// Metrics for a wallet that has just made its first trade.
	pub fn first_trade(
		wallet_address: impl Into<WalletAddress>,
		trade: &TradeData,
		recorded_at: Timestamp,
	) -> Self {
		Self {
			wallet_address: wallet_address.into(),
			score: 0.0,
			last_trade_time: trade.timestamp,
			recorded_at,
			trade_frequency: 1,
			avg_trade_size: trade.trade_size,
			sandwich_attempts: 0,
			frontrun_attempts: 0,
		}
	}

	pub fn malicious_attempts(&self) -> u32 {
		self.sandwich_attempts.saturating_add(self.frontrun_attempts)
	}
}

/// A single trade observation fed into the metrics store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
	pub trade_size: f64,
	pub timestamp: Timestamp,
	pub intent: SwapIntent,
}

/// Adversarial patterns a detector may attribute to a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaliciousPattern {
	Sandwich,
	Frontrun,
}

impl fmt::Display for MaliciousPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sandwich => write!(f, "sandwich"),
			Self::Frontrun => write!(f, "frontrun"),
		}
	}
}
