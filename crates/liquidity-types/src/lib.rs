pub mod common;
pub mod errors;
pub mod events;
pub mod segments;
pub mod swaps;
pub mod toxicity;

pub use common::*;
pub use errors::*;
pub use events::*;
pub use segments::*;
pub use swaps::*;
pub use toxicity::*;
