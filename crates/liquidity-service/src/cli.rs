//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use liquidity_types::{SwapIntent, SwapPriority};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "liquidity-engine")]
#[command(about = "Conditional liquidity segmentation and toxicity engine", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "LIQUIDITY_CONFIG")]
	pub config: Option<PathBuf>,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "LIQUIDITY_LOG_LEVEL")]
	pub log_level: Option<String>,

	/// Emit logs as JSON
	#[arg(long)]
	pub json: bool,

	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Create and execute a series of swaps for one wallet
	#[command(about = "Run swaps through the engine and report outcomes and spreads")]
	Simulate(SimulateArgs),

	/// List configured segmenters and their segments
	Segments,

	/// Score a hand-supplied set of wallet metrics
	#[command(about = "Compute toxicity, segment and spread for the given metrics")]
	Score(ScoreArgs),

	/// Validate the configuration and print a summary
	Validate,
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct SimulateArgs {
	/// Wallet executing the swaps
	#[arg(short, long, default_value = "W1")]
	pub wallet: String,

	/// Number of swaps to run
	#[arg(short = 'n', long, default_value_t = 2)]
	pub count: usize,

	#[arg(long, default_value = "SOL")]
	pub from: String,

	#[arg(long, default_value = "USDC")]
	pub to: String,

	#[arg(long, default_value_t = 100.0)]
	pub amount: f64,

	/// Maximum slippage as a fraction
	#[arg(long, default_value_t = 0.005)]
	pub slippage: f64,

	#[arg(long, default_value = "retail")]
	pub intent: SwapIntent,

	#[arg(long, default_value = "medium")]
	pub priority: SwapPriority,

	/// Pause between swaps in milliseconds
	#[arg(long, default_value_t = 0)]
	pub interval_ms: u64,
}

impl Default for SimulateArgs {
	fn default() -> Self {
		Self {
			wallet: "W1".to_string(),
			count: 2,
			from: "SOL".to_string(),
			to: "USDC".to_string(),
			amount: 100.0,
			slippage: 0.005,
			intent: SwapIntent::Retail,
			priority: SwapPriority::Medium,
			interval_ms: 0,
		}
	}
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScoreArgs {
	#[arg(long, default_value_t = 1)]
	pub trade_frequency: u64,

	#[arg(long, default_value_t = 0.0)]
	pub avg_trade_size: f64,

	#[arg(long, default_value_t = 0)]
	pub sandwich_attempts: u32,

	#[arg(long, default_value_t = 0)]
	pub frontrun_attempts: u32,

	/// Accumulated behaviour flags in [0, 1]
	#[arg(long, default_value_t = 0.0)]
	pub flag_score: f64,

	/// Trade size used for segment selection
	#[arg(long, default_value_t = 100.0)]
	pub trade_size: f64,

	/// Base spread, defaults to the configured one
	#[arg(long)]
	pub base_spread: Option<f64>,
}
