//! Subcommand implementations.

use anyhow::{Context, Result};
use liquidity_config::LiquidityConfig;
use liquidity_core::LiquidityEngine;
use liquidity_types::{now_millis, ExecutionOutcome, SwapId, ToxicityMetrics};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::cli::{ScoreArgs, SimulateArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapReport {
	swap_id: SwapId,
	wallet: String,
	toxicity: f64,
	spread: f64,
	#[serde(flatten)]
	outcome: ExecutionOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreReport {
	toxicity: f64,
	segment: Option<String>,
	spread: f64,
}

fn build_engine(config: LiquidityConfig) -> Result<LiquidityEngine> {
	LiquidityEngine::builder()
		.with_config(config)
		.build()
		.context("Failed to build liquidity engine")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string(value)?);
	Ok(())
}

/// Run `count` swaps for one wallet, printing one JSON report per swap.
///
/// Stops early on Ctrl+C or SIGTERM and always shuts the engine down.
pub async fn simulate(config: LiquidityConfig, args: SimulateArgs) -> Result<()> {
	info!("Starting liquidity engine simulation");
	let engine = build_engine(config)?;
	engine.start().await;

	let mut events = engine.events().subscribe();
	let event_logger = tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(event) => debug!(swap_id = %event.swap_id(), "Swap event: {:?}", event),
				Err(RecvError::Lagged(skipped)) => warn!("Event logger skipped {} events", skipped),
				Err(RecvError::Closed) => break,
			}
		}
	});

	let result = tokio::select! {
		result = run_swaps(&engine, &args) => result,
		_ = crate::shutdown_signal() => Ok(()),
	};

	engine.shutdown().await;
	event_logger.abort();

	info!(
		pending = engine.manager().pending_count(),
		wallets = engine.store().len(),
		"Simulation finished"
	);
	result
}

async fn run_swaps(engine: &LiquidityEngine, args: &SimulateArgs) -> Result<()> {
	let base_spread = engine.config().pricing.base_spread;

	for i in 0..args.count {
		if i > 0 && args.interval_ms > 0 {
			tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
		}

		let swap = engine.create_swap(
			args.from.as_str(),
			args.to.as_str(),
			args.amount,
			args.slippage,
			args.intent,
			args.priority,
		);
		let outcome = engine.execute_swap(&swap.id, &args.wallet).await;

		print_json(&swap_report(
			engine,
			swap.id,
			&args.wallet,
			base_spread,
			args.amount,
			outcome,
		))?;
	}

	Ok(())
}

/// Report for one executed swap, priced from the wallet's metrics after it.
fn swap_report(
	engine: &LiquidityEngine,
	swap_id: SwapId,
	wallet: &str,
	base_spread: f64,
	amount: f64,
	outcome: ExecutionOutcome,
) -> SwapReport {
	SwapReport {
		swap_id,
		wallet: wallet.to_string(),
		toxicity: engine.get_score(wallet),
		spread: engine.optimal_spread(wallet, base_spread, amount),
		outcome,
	}
}

/// Print every configured segmenter with its segments.
pub fn segments(config: LiquidityConfig) -> Result<()> {
	let engine = build_engine(config)?;

	for segmenter in engine.registry().segmenters() {
		println!(
			"{} ({}) active={}",
			segmenter.id, segmenter.name, segmenter.is_active
		);
		for segment in &segmenter.segments {
			println!(
				"  {:<16} spread {:.4}..{:.4}  threshold {:.2}  priority {}",
				segment.id,
				segment.min_spread,
				segment.max_spread,
				segment.toxicity_threshold,
				segment.priority
			);
		}
	}

	Ok(())
}

/// Score hand-supplied metrics with the configured model and segments.
pub fn score(config: LiquidityConfig, args: ScoreArgs) -> Result<()> {
	let base_spread = args.base_spread.unwrap_or(config.pricing.base_spread);
	let engine = build_engine(config)?;

	print_json(&score_report(&engine, &args, base_spread))
}

fn score_report(engine: &LiquidityEngine, args: &ScoreArgs, base_spread: f64) -> ScoreReport {
	let now = now_millis();
	let metrics = ToxicityMetrics {
		wallet_address: "cli".to_string(),
		score: args.flag_score.clamp(0.0, 1.0),
		last_trade_time: now,
		recorded_at: now,
		trade_frequency: args.trade_frequency,
		avg_trade_size: args.avg_trade_size,
		sandwich_attempts: args.sandwich_attempts,
		frontrun_attempts: args.frontrun_attempts,
	};

	let toxicity = engine.store().score_of(&metrics);
	let segment = engine.registry().best_segment(toxicity, args.trade_size);
	let spread = engine
		.resolver()
		.spread_for_score(toxicity, base_spread, args.trade_size);

	ScoreReport {
		toxicity,
		segment: segment.map(|s| s.id),
		spread,
	}
}

/// Report the loaded configuration. Loading already validated it.
pub fn validate(path: Option<&Path>, config: &LiquidityConfig) -> Result<()> {
	match path {
		Some(path) => info!("Validating configuration file: {:?}", path),
		None => info!("Validating configuration from standard locations"),
	}

	LiquidityEngine::builder()
		.with_config(config.clone())
		.build()
		.context("Configuration does not produce a usable engine")?;

	info!("Configuration is valid");
	info!("Service name: {}", config.service.name);
	info!("Base spread: {}", config.pricing.base_spread);
	info!("Execution timeout: {}ms", config.execution.timeout_ms);
	match (config.toxicity.max_idle_secs, config.toxicity.max_wallets) {
		(None, None) => info!("Wallet eviction: disabled"),
		(idle, wallets) => info!(
			"Wallet eviction: max idle {:?}s, max wallets {:?}",
			idle, wallets
		),
	}
	for segmenter in config.segmenters_or_default() {
		info!(
			"  Segmenter: {} ({} segments, active: {})",
			segmenter.id,
			segmenter.segments.len(),
			segmenter.is_active
		);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use liquidity_types::SwapIntent;
	use serde_json::Value;

	const EPS: f64 = 1e-12;

	fn engine() -> LiquidityEngine {
		build_engine(LiquidityConfig::default()).unwrap()
	}

	fn score_args() -> ScoreArgs {
		ScoreArgs {
			trade_frequency: 1,
			avg_trade_size: 100.0,
			sandwich_attempts: 0,
			frontrun_attempts: 0,
			flag_score: 0.0,
			trade_size: 100.0,
			base_spread: None,
		}
	}

	fn keys(value: &Value) -> Vec<String> {
		let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
		keys.sort();
		keys
	}

	#[tokio::test]
	async fn test_swap_report_flattens_outcome() {
		let engine = engine();
		let swap = engine.create_swap("SOL", "USDC", 100.0, 0.005, SwapIntent::Retail, None);
		let outcome = engine.execute_swap(&swap.id, "W1").await;

		let report = swap_report(&engine, swap.id.clone(), "W1", 0.003, 100.0, outcome);
		let json = serde_json::to_value(&report).unwrap();

		assert_eq!(
			keys(&json),
			["spread", "success", "swapId", "toxicity", "txHash", "wallet"]
		);
		assert_eq!(json["swapId"], swap.id.as_str());
		assert_eq!(json["wallet"], "W1");
		assert_eq!(json["success"], true);
		assert!((json["toxicity"].as_f64().unwrap() - 0.023).abs() < EPS);
		assert!((json["spread"].as_f64().unwrap() - (0.002 + 0.001 * 1.0115)).abs() < EPS);
	}

	#[tokio::test]
	async fn test_failed_swap_report_carries_error() {
		let engine = engine();
		let swap = engine.create_swap("SOL", "SOL", 100.0, 0.005, SwapIntent::Retail, None);
		let outcome = engine.execute_swap(&swap.id, "W1").await;

		let json =
			serde_json::to_value(swap_report(&engine, swap.id, "W1", 0.003, 100.0, outcome)).unwrap();

		assert_eq!(
			keys(&json),
			["error", "spread", "success", "swapId", "toxicity", "wallet"]
		);
		assert_eq!(json["success"], false);
		assert_eq!(json["error"], "No route from SOL to itself");
	}

	#[test]
	fn test_score_report_shape() {
		let engine = engine();
		let report = score_report(&engine, &score_args(), 0.003);
		let json = serde_json::to_value(&report).unwrap();

		assert_eq!(keys(&json), ["segment", "spread", "toxicity"]);
		assert_eq!(json["segment"], "retail");
		assert!((json["toxicity"].as_f64().unwrap() - 0.023).abs() < EPS);
		assert!((json["spread"].as_f64().unwrap() - (0.002 + 0.001 * 1.0115)).abs() < EPS);
	}

	#[test]
	fn test_score_report_without_segment() {
		let engine = engine();
		let args = ScoreArgs {
			sandwich_attempts: 10,
			flag_score: 1.0,
			..score_args()
		};

		let json = serde_json::to_value(score_report(&engine, &args, 0.004)).unwrap();
		assert_eq!(json["toxicity"], 1.0);
		assert_eq!(json["segment"], Value::Null);
		assert_eq!(json["spread"], 0.004);
	}
}
