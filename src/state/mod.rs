//! Per-node state slots.
//!
//! State is local to one node and never inherited: a child starts with an
//! empty snapshot regardless of its parent. Snapshots are replaced
//! wholesale (shallow merge, patch keys win) and read through frozen views
//! only.

mod store;

pub use store::StateStore;
