//! Index segments and the store that holds them.

pub mod codec;
pub mod segment;
pub mod store;

pub use segment::{IndexSegment, SegmentBuilder};
pub use store::{IndexStore, SharedIndexStore};
