//! Events published while swaps move through the manager.

use serde::{Deserialize, Serialize};

use crate::{DeclarativeSwap, SwapId, WalletAddress};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SwapEvent {
	Created(DeclarativeSwap),
	Executed {
		swap_id: SwapId,
		wallet: WalletAddress,
		spread: f64,
		tx_hash: String,
	},
	/// The swap stays pending and may be executed again.
	Failed {
		swap_id: SwapId,
		wallet: WalletAddress,
		error: String,
	},
}

impl SwapEvent {
	pub fn swap_id(&self) -> &SwapId {
		match self {
			Self::Created(swap) => &swap.id,
			Self::Executed { swap_id, .. } | Self::Failed { swap_id, .. } => swap_id,
		}
	}
}
