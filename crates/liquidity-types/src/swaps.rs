//! Declarative swap types.
//!
//! A declarative swap is a request tagged with trader intent and priority,
//! created separately from its execution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{SwapId, Timestamp};

/// Trader intent declared on a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapIntent {
	Retail,
	Institutional,
	Arbitrage,
}

impl fmt::Display for SwapIntent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Retail => write!(f, "retail"),
			Self::Institutional => write!(f, "institutional"),
			Self::Arbitrage => write!(f, "arbitrage"),
		}
	}
}

impl FromStr for SwapIntent {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"retail" => Ok(Self::Retail),
			"institutional" => Ok(Self::Institutional),
			"arbitrage" => Ok(Self::Arbitrage),
			other => Err(format!("unknown swap intent '{}'", other)),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapPriority {
	Low,
	#[default]
	Medium,
	High,
}

impl fmt::Display for SwapPriority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Low => write!(f, "low"),
			Self::Medium => write!(f, "medium"),
			Self::High => write!(f, "high"),
		}
	}
}

impl FromStr for SwapPriority {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"low" => Ok(Self::Low),
			"medium" => Ok(Self::Medium),
			"high" => Ok(Self::High),
			other => Err(format!("unknown swap priority '{}'", other)),
		}
	}
}

/// A swap request waiting in the pending set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarativeSwap {
	pub id: SwapId,
	pub from_token: String,
	pub to_token: String,
	/// Not checked for positivity; callers validate amounts.
	pub amount: f64,
	/// Maximum slippage as a fraction (0.005 = 0.5%).
	pub max_slippage: f64,
	pub intent: SwapIntent,
	pub priority: SwapPriority,
	/// Creation time in Unix milliseconds.
	pub timestamp: Timestamp,
}

/// Execution state of a swap still held by the manager.
///
/// Executed swaps leave the pending set, so there is no terminal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapState {
	Pending,
	Executing,
}

/// Result reported back to the caller of `execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl ExecutionOutcome {
	pub fn executed(tx_hash: impl Into<String>) -> Self {
		Self {
			success: true,
			tx_hash: Some(tx_hash.into()),
			error: None,
		}
	}

	pub fn failed(error: impl ToString) -> Self {
		Self {
			success: false,
			tx_hash: None,
			error: Some(error.to_string()),
		}
	}
}
