//! Hagakure Store - Persistent vector context store
//!
//! This crate owns the flat nearest-neighbor index, the ordered document
//! list aligned with it, and the on-disk format both are saved in.

pub mod context_store;
pub mod index;
pub mod persistence;
pub mod snapshot;

pub use context_store::{ContextStore, CONTEXT_SEPARATOR};
pub use index::{squared_l2, FlatL2Index};
pub use persistence::{LoadedStore, FORMAT_VERSION};
pub use snapshot::StoreSnapshot;
