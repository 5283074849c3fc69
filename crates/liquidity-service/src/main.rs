use anyhow::{Context, Result};
use clap::Parser;
use liquidity_config::{load_config, ConfigLoader, LiquidityConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => ConfigLoader::from_env_and_file(Some(path.as_path())),
		None => load_config(),
	}
	.context("Failed to load configuration")?;

	// Initialize tracing
	setup_tracing(log_level(&args, &config), args.json)?;

	match args.command {
		Some(Command::Simulate(simulate)) => commands::simulate(config, simulate).await,
		Some(Command::Segments) => commands::segments(config),
		Some(Command::Score(score)) => commands::score(config, score),
		Some(Command::Validate) => commands::validate(args.config.as_deref(), &config),
		None => commands::simulate(config, Default::default()).await,
	}
}

/// `--log-level` (or `LIQUIDITY_LOG_LEVEL`) overrides the configured level.
/// `RUST_LOG` overrides both inside [`setup_tracing`].
fn log_level<'a>(args: &'a Args, config: &'a LiquidityConfig) -> &'a str {
	args
		.log_level
		.as_deref()
		.unwrap_or(config.service.log_level.as_str())
}

fn setup_tracing(log_level: &str, json: bool) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.with_context(|| format!("Invalid log level '{}'", log_level))?;

	let registry = tracing_subscriber::registry().with(env_filter);
	if json {
		registry.with(tracing_subscriber::fmt::layer().json()).init();
	} else {
		registry.with(tracing_subscriber::fmt::layer()).init();
	}

	Ok(())
}

pub(crate) async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			warn!("Failed to install Ctrl+C handler: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				warn!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
	info!("Shutdown signal received");
}
