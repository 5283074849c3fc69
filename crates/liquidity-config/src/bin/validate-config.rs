//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/liquidity.toml

use std::env;
use std::process;

use liquidity_config::ConfigLoader;

fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::from_file(config_path) {
		Ok(config) => {
			println!("✅ Configuration is valid!");
			println!("Service name: {}", config.service.name);
			println!("Base spread: {}", config.pricing.base_spread);
			println!("Execution timeout: {}ms", config.execution.timeout_ms);
			for segmenter in config.segmenters_or_default() {
				println!(
					"Segmenter {} ({} segments, active: {})",
					segmenter.id,
					segmenter.segments.len(),
					segmenter.is_active
				);
			}
		}
		Err(e) => {
			eprintln!("❌ Configuration validation failed:");
			eprintln!("{:#}", e);
			process::exit(1);
		}
	}
}
