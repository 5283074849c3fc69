//! Common types used throughout the liquidity engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque wallet identifier supplied by the wallet-identity provider.
pub type WalletAddress = String;

/// Timestamp (Unix milliseconds)
pub type Timestamp = u64;

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> Timestamp {
	chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Unique identifier of a declarative swap.
///
/// Generated from a v4 UUID so that ids stay unique under concurrent
/// creation without any shared counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapId(String);

impl SwapId {
	pub fn generate() -> Self {
		Self(format!("swap_{}", uuid::Uuid::new_v4().simple()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for SwapId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for SwapId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl fmt::Display for SwapId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Truncate a hash or long identifier for display purposes.
///
/// Keeps the first 6 and last 4 characters; strings of 12 characters or
/// fewer are returned unchanged.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 12 || !id.is_ascii() {
		id.to_string()
	} else {
		format!("{}...{}", &id[..6], &id[id.len() - 4..])
	}
}
