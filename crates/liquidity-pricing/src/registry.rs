//! Registry of liquidity segmenters.

use arc_swap::ArcSwap;
use liquidity_types::{LiquidityError, LiquiditySegment, Result, Segmenter};
use tracing::{debug, info};

/// Holds the configured segmenters and picks the best segment for a wallet.
///
/// Lookups read an immutable snapshot and never block; registration swaps
/// in a new snapshot.
pub struct SegmentRegistry {
	segmenters: ArcSwap<Vec<Segmenter>>,
}

impl SegmentRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			segmenters: ArcSwap::from_pointee(Vec::new()),
		}
	}

	/// Creates a registry holding the default aggregator segmenter.
	pub fn with_defaults() -> Self {
		Self::from_segmenters(vec![Segmenter::aggregator()])
			.unwrap_or_else(|_| Self::new())
	}

	/// Creates a registry from configured segmenters, validating each one.
	pub fn from_segmenters(segmenters: Vec<Segmenter>) -> Result<Self> {
		let registry = Self::new();
		for segmenter in segmenters {
			registry.register_segmenter(segmenter)?;
		}
		Ok(registry)
	}

	/// Register a segmenter, replacing any existing one with the same id.
	pub fn register_segmenter(&self, segmenter: Segmenter) -> Result<()> {
		segmenter.validate()?;

		info!(
			"Registering segmenter {} with {} segments (active: {})",
			segmenter.id,
			segmenter.segments.len(),
			segmenter.is_active
		);

		self.segmenters.rcu(|current| {
			let mut next: Vec<Segmenter> = current
				.iter()
				.filter(|existing| existing.id != segmenter.id)
				.cloned()
				.collect();
			next.push(segmenter.clone());
			next
		});
		Ok(())
	}

	/// Enable or disable a segmenter.
	pub fn set_active(&self, segmenter_id: &str, active: bool) -> Result<()> {
		if !self.segmenters.load().iter().any(|s| s.id == segmenter_id) {
			return Err(LiquidityError::InvalidSegment(format!(
				"Unknown segmenter {}",
				segmenter_id
			)));
		}

		self.segmenters.rcu(|current| {
			current
				.iter()
				.cloned()
				.map(|mut segmenter| {
					if segmenter.id == segmenter_id {
						segmenter.is_active = active;
					}
					segmenter
				})
				.collect::<Vec<_>>()
		});

		info!("Segmenter {} active: {}", segmenter_id, active);
		Ok(())
	}

	/// All segmenters currently switched on.
	pub fn active_segmenters(&self) -> Vec<Segmenter> {
		self.segmenters
			.load()
			.iter()
			.filter(|s| s.is_active)
			.cloned()
			.collect()
	}

	pub fn segmenters(&self) -> Vec<Segmenter> {
		(*self.segmenters.load_full()).clone()
	}

	/// Best segment admitting the given toxicity score.
	///
	/// A segment admits a wallet when `toxicity <= toxicity_threshold`.
	/// Among admitting segments of active segmenters the one maximising
	/// `priority * (1 - toxicity)` wins; the first one seen wins ties.
	///
	/// `_trade_size` is accepted for future size-based tiers and does not
	/// affect selection.
	pub fn best_segment(&self, toxicity: f64, _trade_size: f64) -> Option<LiquiditySegment> {
		let segmenters = self.segmenters.load();

		let mut best: Option<&LiquiditySegment> = None;
		let mut best_score = f64::NEG_INFINITY;

		for segment in segmenters
			.iter()
			.filter(|s| s.is_active)
			.flat_map(|s| s.segments.iter())
			.filter(|segment| segment.admits(toxicity))
		{
			let score = segment.priority as f64 * (1.0 - toxicity);
			if score > best_score {
				best_score = score;
				best = Some(segment);
			}
		}

		match best {
			Some(segment) => {
				debug!(toxicity, segment = %segment.id, "Selected liquidity segment");
				Some(segment.clone())
			}
			None => {
				debug!(toxicity, "No segment admits wallet");
				None
			}
		}
	}
}

impl Default for SegmentRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}
