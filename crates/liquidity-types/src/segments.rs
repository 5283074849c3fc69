//! Liquidity segment types.
//!
//! A segment is a tier of spread treatment keyed by a toxicity admission
//! threshold and a priority. Segments are grouped into segmenters, which
//! can be switched on and off as a unit.

use serde::{Deserialize, Serialize};

use crate::{LiquidityError, Result};

/// A named tier of spread treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySegment {
	pub id: String,
	pub name: String,
	/// Minimum spread for this segment, as a fraction.
	pub min_spread: f64,
	/// Maximum spread for this segment, as a fraction.
	pub max_spread: f64,
	/// Highest toxicity score admitted to this segment.
	pub toxicity_threshold: f64,
	/// Higher is preferred when several segments admit the same wallet.
	pub priority: u32,
}

impl LiquiditySegment {
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		min_spread: f64,
		max_spread: f64,
		toxicity_threshold: f64,
		priority: u32,
	) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			min_spread,
			max_spread,
			toxicity_threshold,
			priority,
		}
	}

	/// Whether a wallet with the given toxicity may trade in this segment.
	pub fn admits(&self, toxicity: f64) -> bool {
		toxicity <= self.toxicity_threshold
	}

	/// Checks `0 < min_spread <= max_spread` and a threshold within [0, 1].
	pub fn validate(&self) -> Result<()> {
		if self.id.is_empty() {
			return Err(LiquidityError::InvalidSegment(
				"segment id must not be empty".to_string(),
			));
		}
		let spreads_ordered = self.min_spread > 0.0 && self.max_spread >= self.min_spread;
		if !spreads_ordered {
			return Err(LiquidityError::InvalidSegment(format!(
				"segment '{}': spreads must satisfy 0 < min ({}) <= max ({})",
				self.id, self.min_spread, self.max_spread
			)));
		}
		if !(0.0..=1.0).contains(&self.toxicity_threshold) {
			return Err(LiquidityError::InvalidSegment(format!(
				"segment '{}': toxicity threshold {} outside [0, 1]",
				self.id, self.toxicity_threshold
			)));
		}
		Ok(())
	}
}

/// A group of segments supplied by one liquidity source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmenter {
	pub id: String,
	pub name: String,
	pub segments: Vec<LiquiditySegment>,
	#[serde(default = "default_active")]
	pub is_active: bool,
}

fn default_active() -> bool {
	true
}

impl Segmenter {
	/// The aggregator segmenter registered at startup.
	pub fn aggregator() -> Self {
		Self {
			id: "aggregator".to_string(),
			name: "Aggregator".to_string(),
			segments: default_segments(),
			is_active: true,
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.id.is_empty() {
			return Err(LiquidityError::InvalidSegment(
				"segmenter id must not be empty".to_string(),
			));
		}
		for (idx, segment) in self.segments.iter().enumerate() {
			segment.validate()?;
			if self.segments[..idx].iter().any(|s| s.id == segment.id) {
				return Err(LiquidityError::InvalidSegment(format!(
					"duplicate segment id '{}' in segmenter '{}'",
					segment.id, self.id
				)));
			}
		}
		Ok(())
	}
}

/// Default retail, institutional and arbitrage tiers.
pub fn default_segments() -> Vec<LiquiditySegment> {
	vec![
		LiquiditySegment::new("retail", "Retail Traders", 0.002, 0.003, 0.3, 3),
		LiquiditySegment::new("institutional", "Institutional Traders", 0.001, 0.002, 0.1, 2),
		LiquiditySegment::new("arbitrage", "Arbitrage Traders", 0.004, 0.006, 0.8, 1),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_segments() {
		let segments = default_segments();
		assert_eq!(segments.len(), 3);

		let retail = &segments[0];
		assert_eq!(retail.id, "retail");
		assert_eq!(retail.min_spread, 0.002);
		assert_eq!(retail.max_spread, 0.003);
		assert_eq!(retail.toxicity_threshold, 0.3);
		assert_eq!(retail.priority, 3);

		let institutional = &segments[1];
		assert_eq!(institutional.id, "institutional");
		assert_eq!(institutional.min_spread, 0.001);
		assert_eq!(institutional.max_spread, 0.002);
		assert_eq!(institutional.toxicity_threshold, 0.1);
		assert_eq!(institutional.priority, 2);

		let arbitrage = &segments[2];
		assert_eq!(arbitrage.id, "arbitrage");
		assert_eq!(arbitrage.min_spread, 0.004);
		assert_eq!(arbitrage.max_spread, 0.006);
		assert_eq!(arbitrage.toxicity_threshold, 0.8);
		assert_eq!(arbitrage.priority, 1);

		assert!(Segmenter::aggregator().validate().is_ok());
	}

	#[test]
	fn test_segment_validation() {
		let inverted = LiquiditySegment::new("bad", "Bad", 0.004, 0.002, 0.5, 1);
		assert!(matches!(
			inverted.validate(),
			Err(LiquidityError::InvalidSegment(_))
		));

		let zero = LiquiditySegment::new("zero", "Zero", 0.0, 0.002, 0.5, 1);
		assert!(zero.validate().is_err());

		let threshold = LiquiditySegment::new("tox", "Tox", 0.001, 0.002, 1.5, 1);
		assert!(threshold.validate().is_err());

		let flat = LiquiditySegment::new("flat", "Flat", 0.002, 0.002, 1.0, 1);
		assert!(flat.validate().is_ok());
	}

	#[test]
	fn test_duplicate_segment_ids_rejected() {
		let mut segmenter = Segmenter::aggregator();
		segmenter.segments.push(default_segments()[0].clone());
		assert!(segmenter.validate().is_err());
	}

	#[test]
	fn test_segmenter_active_by_default() {
		let json = r#"{"id":"s","name":"S","segments":[]}"#;
		let segmenter: Segmenter = serde_json::from_str(json).unwrap();
		assert!(segmenter.is_active);
	}
}
