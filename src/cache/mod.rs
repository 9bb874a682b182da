//! Caching layer over the local store.
//!
//! - [`Cacheable`] maps entities onto collections, keys, and indexes
//! - [`CacheAccessor`] is the typed per-entity surface the rest of the
//!   application goes through; nothing else touches raw collection names

mod accessor;
mod traits;

pub use accessor::CacheAccessor;
pub use traits::{Cacheable, CachedRecord, Collection, IndexSlot};
