//! Declarative swap orchestration for the conditional liquidity engine.
//!
//! The [`DeclarativeSwapManager`] keeps intent-tagged swaps pending until
//! they are executed. Executing a swap records the trade against the
//! wallet's toxicity metrics, prices it with the [`SpreadResolver`] and
//! hands it to a [`SwapExecutor`]. [`LiquidityEngineBuilder`] wires all of
//! these together from a [`LiquidityConfig`].
//!
//! [`SpreadResolver`]: liquidity_pricing::SpreadResolver
//! [`LiquidityConfig`]: liquidity_config::LiquidityConfig

pub mod engine;
pub mod event_bus;
pub mod executor;
pub mod manager;

/// Re-export implementations
pub mod implementations {
	pub mod simulated;
}

pub use engine::{LiquidityEngine, LiquidityEngineBuilder};
pub use event_bus::EventBus;
pub use executor::{ExecutionRequest, SwapExecutor};
pub use implementations::simulated::SimulatedExecutor;
pub use manager::DeclarativeSwapManager;
