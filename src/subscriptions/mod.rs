//! Subscription system for live context updates.
//!
//! In-process subscriptions to per-node events:
//! - State replacements
//! - Decorator registrations
//!
//! Buffers are bounded; slow subscribers are dropped rather than blocking
//! the mutating caller. Subscriptions are per node and are not inherited
//! by snapshots.
//!
//! # Example
//!
//! ```ignore
//! let handle = ctx.subscribe(SubscriptionConfig::default());
//!
//! ctx.set_state(json!({ "ready": true }), Some("boot"))?;
//!
//! match handle.recv() {
//!     Ok(ContextEvent::StateChanged { state, version, .. }) => { /* ... */ }
//!     Ok(ContextEvent::Dropped { reason }) => { /* slow consumer */ }
//!     _ => {}
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{ContextEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId};
