//! Error types for the conditional liquidity engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LiquidityError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiquidityError {
	/// The swap id is not (or no longer) in the pending set.
	#[error("Swap not found")]
	NotFound(String),

	#[error("Execution error: {0}")]
	Execution(String),

	#[error("Swap execution timed out after {after_ms}ms")]
	Timeout { after_ms: u64 },

	#[error("Swap {0} is already executing")]
	AlreadyExecuting(String),

	#[error("Invalid segment: {0}")]
	InvalidSegment(String),

	#[error("Unknown wallet: {0}")]
	UnknownWallet(String),
}
