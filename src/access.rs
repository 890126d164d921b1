//! Free-function access to an opaque context node.
//!
//! These call the typed accessors directly, bypassing the public key space,
//! so they behave identically whether or not built-in names are enabled on
//! the node.

use crate::context::Context;
use crate::error::Result;
use crate::types::{ContextOptions, Value};
use crate::views::FrozenView;
use serde_json::Value as Json;

/// Top-most ancestor of `ctx`.
pub fn get_root(ctx: &Context) -> Context {
    ctx.root()
}

/// Parent of `ctx`, or `None` for a root.
pub fn get_parent(ctx: &Context) -> Option<Context> {
    ctx.parent()
}

/// Current state snapshot of `ctx`.
pub fn get_state(ctx: &Context) -> FrozenView {
    ctx.state()
}

/// Replace the state of `ctx` (shallow merge, patch keys win).
pub fn set_state(ctx: &Context, patch: Json, reason: Option<&str>) -> Result<FrozenView> {
    ctx.set_state(patch, reason)
}

/// Attach a named extension to `ctx`.
pub fn decorate(ctx: &Context, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
    ctx.decorate(name, value).map(|_| ())
}

/// Derive a child of `ctx`.
pub fn get_snapshot(ctx: &Context, opts: Option<ContextOptions>) -> Result<Context> {
    ctx.snapshot(opts)
}
