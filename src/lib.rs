//! # Lamina
//!
//! A hierarchical, copy-on-write context store: a key/value container that
//! can be snapshotted from a parent, inherits the parent's readable
//! properties, isolates its own writes, and supports two orthogonal
//! extension mechanisms: named decorators and a versioned, read-only
//! state snapshot.
//!
//! ## Core Concepts
//!
//! - **Root node**: owns its backing mapping and may mutate it directly
//! - **Snapshot node**: inherits reads from the parent chain, isolates writes
//! - **Decorators**: named extensions attached to one node, visible to its
//!   descendants unless shadowed
//! - **State**: an immutable, wholesale-replaced snapshot local to one node
//! - **Frozen views**: lazy read-only wrapping of inherited composite reads
//!
//! ## Example
//!
//! ```ignore
//! use lamina::{Context, ContextOptions, Value};
//! use serde_json::json;
//!
//! let root = Context::from_json(json!({ "name": "alice" }), ContextOptions::default())?;
//! root.decorate("greet", Value::function(|ctx, _args| {
//!     Ok(json!(format!("hello {}", ctx.get_json("name").unwrap())))
//! }))?;
//!
//! let child = root.snapshot(None)?;
//! assert_eq!(child.call("greet", &[])?, json!("hello alice"));
//!
//! root.set_state(json!({ "ready": true }), Some("boot"))?;
//! assert!(child.state().is_empty());
//! ```

pub mod access;
pub mod context;
pub mod decorators;
pub mod error;
pub mod state;
pub mod subscriptions;
pub mod types;
pub mod views;

// Re-exports
pub use access::{decorate, get_parent, get_root, get_snapshot, get_state, set_state};
pub use context::{Context, Source};
pub use decorators::DecoratorRegistry;
pub use error::{ContextError, Result};
pub use state::StateStore;
pub use subscriptions::{
    ContextEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
pub use types::{BuiltIn, ContextFn, ContextMap, ContextOptions, StateChangeHook, Value};
pub use views::{freeze, FrozenView, LiveView};
