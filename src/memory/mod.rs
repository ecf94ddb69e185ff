//! Memory propagated along graph edges
//!
//! A unit's local memory is extracted from its own finished translation; its
//! incident memory is aggregated from the local memories of its direct
//! predecessors just before it is translated.

pub mod aggregate;
pub mod encode;
mod store;
mod types;

pub use encode::{encode_memory, EncodingConfig};
pub use store::{MemoryConfig, MemoryStore};
pub use types::{Memory, MemoryComponent, NO_SUMMARY};
