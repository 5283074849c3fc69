//! Configuration loading from files and environment.

use crate::types::*;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "LIQUIDITY_";

/// Serialization format of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	/// `.toml`, `.json`, `.yaml` and `.yml` are recognised.
	pub fn from_path(path: &Path) -> Option<Self> {
		match path.extension()?.to_str()? {
			"toml" => Some(Self::Toml),
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}
}

/// Reads `LiquidityConfig` from files, strings and the environment.
///
/// Every entry point that touches a file validates the result; the string
/// parsers only deserialize, so callers can tweak before validating.
pub struct ConfigLoader;

impl ConfigLoader {
	/// Parse and validate a config file. Sections missing from the file
	/// keep their defaults.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LiquidityConfig> {
		let path = path.as_ref();
		let format = ConfigFormat::from_path(path)
			.with_context(|| format!("Unsupported config format: {:?}", path))?;
		info!("Loading {:?} configuration from {:?}", format, path);

		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {:?}", path))?;
		let config = Self::parse(&contents, format)?;

		Self::validate_config(&config)?;
		Ok(config)
	}

	pub fn parse(contents: &str, format: ConfigFormat) -> Result<LiquidityConfig> {
		match format {
			ConfigFormat::Toml => Self::from_toml(contents),
			ConfigFormat::Json => Self::from_json(contents),
			ConfigFormat::Yaml => Self::from_yaml(contents),
		}
	}

	pub fn from_toml(contents: &str) -> Result<LiquidityConfig> {
		toml::from_str(contents).context("Invalid TOML configuration")
	}

	pub fn from_json(contents: &str) -> Result<LiquidityConfig> {
		serde_json::from_str(contents).context("Invalid JSON configuration")
	}

	pub fn from_yaml(contents: &str) -> Result<LiquidityConfig> {
		serde_yaml::from_str(contents).context("Invalid YAML configuration")
	}

	/// Defaults, or `file_path` when given, with `LIQUIDITY_*` overrides
	/// applied on top. The merged result is validated once.
	pub fn from_env_and_file(file_path: Option<&Path>) -> Result<LiquidityConfig> {
		let mut config = match file_path {
			Some(path) => Self::from_file(path)?,
			None => LiquidityConfig::default(),
		};
		Self::apply_env_overrides(&mut config)?;
		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Apply `LIQUIDITY_*` environment variable overrides
	pub fn apply_env_overrides(config: &mut LiquidityConfig) -> Result<()> {
		Self::apply_overrides_from(config, |key| std::env::var(key).ok())
	}

	/// Apply overrides using an arbitrary variable lookup.
	///
	/// Unparseable values are reported instead of being silently ignored.
	pub fn apply_overrides_from<F>(config: &mut LiquidityConfig, lookup: F) -> Result<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

		if let Some(level) = var("LOG_LEVEL") {
			debug!("Overriding log level from environment");
			config.service.log_level = level;
		}

		if let Some(spread) = var("BASE_SPREAD") {
			debug!("Overriding base spread from environment");
			config.pricing.base_spread = spread
				.parse()
				.with_context(|| format!("Invalid {}BASE_SPREAD: {}", ENV_PREFIX, spread))?;
		}

		if let Some(timeout) = var("EXECUTION_TIMEOUT_MS") {
			debug!("Overriding execution timeout from environment");
			config.execution.timeout_ms = timeout.parse().with_context(|| {
				format!("Invalid {}EXECUTION_TIMEOUT_MS: {}", ENV_PREFIX, timeout)
			})?;
		}

		if let Some(max_wallets) = var("MAX_WALLETS") {
			debug!("Overriding wallet capacity from environment");
			config.toxicity.max_wallets = Some(max_wallets.parse().with_context(|| {
				format!("Invalid {}MAX_WALLETS: {}", ENV_PREFIX, max_wallets)
			})?);
		}

		Ok(())
	}

	/// Validate configuration
	pub fn validate_config(config: &LiquidityConfig) -> Result<()> {
		let tox = &config.toxicity;
		let weights = [
			("frequency_weight", tox.frequency_weight),
			("size_weight", tox.size_weight),
			("pattern_weight", tox.pattern_weight),
			("hft_penalty", tox.hft_penalty),
			("arbitrage_penalty", tox.arbitrage_penalty),
		];
		for (name, value) in weights {
			if !(value.is_finite() && value >= 0.0) {
				anyhow::bail!("toxicity.{} must be a non-negative number, got {}", name, value);
			}
		}

		let norms = [
			("frequency_norm", tox.frequency_norm),
			("size_norm", tox.size_norm),
			("pattern_norm", tox.pattern_norm),
		];
		for (name, value) in norms {
			if !(value.is_finite() && value > 0.0) {
				anyhow::bail!("toxicity.{} must be positive, got {}", name, value);
			}
		}

		if tox.max_wallets == Some(0) {
			anyhow::bail!("toxicity.max_wallets must be at least 1 when set");
		}

		let pricing = &config.pricing;
		if !(pricing.base_spread.is_finite() && pricing.base_spread > 0.0) {
			anyhow::bail!("pricing.base_spread must be positive, got {}", pricing.base_spread);
		}
		if !(pricing.spread_cap_multiplier >= 1.0) {
			anyhow::bail!(
				"pricing.spread_cap_multiplier must be at least 1.0, got {}",
				pricing.spread_cap_multiplier
			);
		}
		if !(pricing.toxicity_spread_factor >= 0.0) {
			anyhow::bail!(
				"pricing.toxicity_spread_factor must be non-negative, got {}",
				pricing.toxicity_spread_factor
			);
		}

		if config.execution.timeout_ms == 0 {
			anyhow::bail!("execution.timeout_ms must be positive");
		}

		let mut seen = HashSet::new();
		for segmenter in &config.segmenters {
			if !seen.insert(segmenter.id.as_str()) {
				anyhow::bail!("Segmenter '{}' configured more than once", segmenter.id);
			}
			segmenter
				.validate()
				.with_context(|| format!("Invalid segmenter '{}'", segmenter.id))?;
		}

		Ok(())
	}
}

/// Load configuration from standard locations
pub fn load_config() -> Result<LiquidityConfig> {
	// Check for config file in order:
	// 1. Environment variable LIQUIDITY_CONFIG
	// 2. ./liquidity.toml
	// 3. ./config/liquidity.toml
	// 4. Default config with env overrides

	if let Ok(path) = std::env::var(format!("{}CONFIG", ENV_PREFIX)) {
		return ConfigLoader::from_env_and_file(Some(Path::new(&path)));
	}

	let paths = ["./liquidity.toml", "./config/liquidity.toml"];

	for path in &paths {
		if Path::new(path).exists() {
			return ConfigLoader::from_env_and_file(Some(Path::new(path)));
		}
	}

	ConfigLoader::from_env_and_file(None)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	#[test]
	fn test_partial_toml_uses_defaults() {
		let toml = r#"
[service]
name = "test-engine"

[pricing]
base_spread = 0.004
"#;

		let config = ConfigLoader::from_toml(toml).unwrap();
		assert_eq!(config.service.name, "test-engine");
		assert_eq!(config.service.log_level, "info");
		assert_eq!(config.pricing.base_spread, 0.004);
		assert_eq!(config.pricing.spread_cap_multiplier, 1.2);
		assert_eq!(config.toxicity.size_norm, 1000.0);
		assert!(config.segmenters.is_empty());
	}

	#[test]
	fn test_toml_parsing_with_segmenters() {
		let toml = r#"
[toxicity]
max_idle_secs = 3600
max_wallets = 50000

[[segmenters]]
id = "otc"
name = "OTC Desk"
is_active = false

[[segmenters.segments]]
id = "whale"
name = "Whales"
min_spread = 0.0005
max_spread = 0.001
toxicity_threshold = 0.05
priority = 10
"#;

		let config = ConfigLoader::from_toml(toml).unwrap();
		ConfigLoader::validate_config(&config).unwrap();
		assert_eq!(config.toxicity.max_idle_secs, Some(3600));
		assert_eq!(config.toxicity.max_wallets, Some(50000));
		assert_eq!(config.segmenters.len(), 1);

		let otc = &config.segmenters[0];
		assert!(!otc.is_active);
		assert_eq!(otc.segments[0].priority, 10);
		assert_eq!(otc.segments[0].toxicity_threshold, 0.05);
	}

	#[test]
	fn test_json_and_yaml_parsing() {
		let json = r#"{"execution": {"timeout_ms": 250}}"#;
		let config = ConfigLoader::from_json(json).unwrap();
		assert_eq!(config.execution.timeout_ms, 250);

		let yaml = "toxicity:\n  hft_window_ms: 500\n";
		let config = ConfigLoader::from_yaml(yaml).unwrap();
		assert_eq!(config.toxicity.hft_window_ms, 500);
		assert_eq!(config.toxicity.hft_penalty, 0.1);
	}

	#[test]
	fn test_env_overrides() {
		let vars: HashMap<&str, &str> = [
			("LIQUIDITY_LOG_LEVEL", "debug"),
			("LIQUIDITY_BASE_SPREAD", "0.005"),
			("LIQUIDITY_EXECUTION_TIMEOUT_MS", "1500"),
			("LIQUIDITY_MAX_WALLETS", "10"),
		]
		.into_iter()
		.collect();

		let mut config = LiquidityConfig::default();
		ConfigLoader::apply_overrides_from(&mut config, |key| {
			vars.get(key).map(|v| v.to_string())
		})
		.unwrap();

		assert_eq!(config.service.log_level, "debug");
		assert_eq!(config.pricing.base_spread, 0.005);
		assert_eq!(config.execution.timeout_ms, 1500);
		assert_eq!(config.toxicity.max_wallets, Some(10));
	}

	#[test]
	fn test_invalid_env_override_is_an_error() {
		let mut config = LiquidityConfig::default();
		let result = ConfigLoader::apply_overrides_from(&mut config, |key| {
			(key == "LIQUIDITY_BASE_SPREAD").then(|| "wide".to_string())
		});
		assert!(result.is_err());
		assert_eq!(config.pricing.base_spread, 0.003);
	}

	#[test]
	fn test_validation_rejects_bad_values() {
		let mut config = LiquidityConfig::default();
		config.pricing.base_spread = 0.0;
		assert!(ConfigLoader::validate_config(&config).is_err());

		let mut config = LiquidityConfig::default();
		config.pricing.spread_cap_multiplier = 0.9;
		assert!(ConfigLoader::validate_config(&config).is_err());

		let mut config = LiquidityConfig::default();
		config.toxicity.size_norm = 0.0;
		assert!(ConfigLoader::validate_config(&config).is_err());

		let mut config = LiquidityConfig::default();
		config.execution.timeout_ms = 0;
		assert!(ConfigLoader::validate_config(&config).is_err());

		let mut config = LiquidityConfig::default();
		config.segmenters = vec![
			liquidity_types::Segmenter::aggregator(),
			liquidity_types::Segmenter::aggregator(),
		];
		assert!(ConfigLoader::validate_config(&config).is_err());

		assert!(ConfigLoader::validate_config(&LiquidityConfig::default()).is_ok());
	}

	#[test]
	fn test_from_file() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(file, "[execution]\ntimeout_ms = 42").unwrap();

		let config = ConfigLoader::from_file(file.path()).unwrap();
		assert_eq!(config.execution.timeout_ms, 42);
	}

	#[test]
	fn test_format_from_extension() {
		assert_eq!(ConfigFormat::from_path(Path::new("a/b.toml")), Some(ConfigFormat::Toml));
		assert_eq!(ConfigFormat::from_path(Path::new("b.yml")), Some(ConfigFormat::Yaml));
		assert_eq!(ConfigFormat::from_path(Path::new("b.json")), Some(ConfigFormat::Json));
		assert_eq!(ConfigFormat::from_path(Path::new("b.ini")), None);
		assert_eq!(ConfigFormat::from_path(Path::new("liquidity")), None);
	}

	#[test]
	fn test_from_file_rejects_unknown_extension() {
		let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
		assert!(ConfigLoader::from_file(file.path()).is_err());
	}

	#[test]
	fn test_from_file_rejects_invalid_segment() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(
			file,
			r#"
[[segmenters]]
id = "broken"
name = "Broken"

[[segmenters.segments]]
id = "inverted"
name = "Inverted"
min_spread = 0.006
max_spread = 0.004
toxicity_threshold = 0.5
priority = 1
"#
		)
		.unwrap();

		assert!(ConfigLoader::from_file(file.path()).is_err());
	}

	#[test]
	fn test_sample_config_matches_defaults() {
		let config = ConfigLoader::from_toml(include_str!("../../../config/liquidity.toml")).unwrap();
		ConfigLoader::validate_config(&config).unwrap();

		assert_eq!(config.toxicity, ToxicityConfig::default());
		assert_eq!(config.pricing.base_spread, 0.003);
		assert_eq!(config.segmenters.len(), 1);
		assert_eq!(config.segmenters[0].id, "aggregator");
		assert_eq!(
			config.segmenters[0].segments,
			liquidity_types::default_segments()
		);
	}
}
