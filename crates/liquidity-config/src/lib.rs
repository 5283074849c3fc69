//! Configuration for the conditional liquidity engine.
//!
//! Configuration can be read from TOML, JSON or YAML files. Every section
//! falls back to its defaults, so a file only needs to name the values it
//! changes. Environment variables prefixed with `LIQUIDITY_` override file
//! values.

pub mod loader;
pub mod types;

pub use loader::{load_config, ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use types::*;
