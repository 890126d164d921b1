//! Core types for the context store.

use crate::context::Context;
use crate::error::Result;
use crate::views::{FrozenView, LiveView};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Plain backing mapping for a root node.
pub type ContextMap = HashMap<String, Value>;

/// Callback invoked synchronously after each successful state replacement.
pub type StateChangeHook = Arc<dyn Fn(&FrozenView, Option<&str>) + Send + Sync>;

/// Shared callable attached to a context (a function decorator or a
/// function-typed backing property).
///
/// The function receives the context it was resolved through, so it can
/// reach sibling decorators and built-ins.
#[derive(Clone)]
pub struct ContextFn(Arc<dyn Fn(&Context, &[Json]) -> Result<Json> + Send + Sync>);

impl ContextFn {
    pub fn new(f: impl Fn(&Context, &[Json]) -> Result<Json> + Send + Sync + 'static) -> Self {
        ContextFn(Arc::new(f))
    }

    /// Invoke the function with the given context and arguments.
    pub fn call(&self, ctx: &Context, args: &[Json]) -> Result<Json> {
        (self.0)(ctx, args)
    }
}

impl fmt::Debug for ContextFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextFn")
    }
}

impl PartialEq for ContextFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Reserved accessor names.
///
/// Resolvable through the key space when `built_in_methods` is enabled, and
/// always reachable through the typed methods regardless of that flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    Root,
    Parent,
    State,
    Decorate,
    Snapshot,
    SetState,
}

impl BuiltIn {
    /// Look up a reserved name. `"clone"` is an alias for `"snapshot"`.
    pub fn from_name(name: &str) -> Option<BuiltIn> {
        match name {
            "root" => Some(BuiltIn::Root),
            "parent" => Some(BuiltIn::Parent),
            "state" => Some(BuiltIn::State),
            "decorate" => Some(BuiltIn::Decorate),
            "snapshot" | "clone" => Some(BuiltIn::Snapshot),
            "set_state" => Some(BuiltIn::SetState),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::Root => "root",
            BuiltIn::Parent => "parent",
            BuiltIn::State => "state",
            BuiltIn::Decorate => "decorate",
            BuiltIn::Snapshot => "snapshot",
            BuiltIn::SetState => "set_state",
        }
    }
}

/// What a read against a context resolves to.
#[derive(Clone, Debug)]
pub enum Value {
    /// Plain detached data (scalars, or composites stored before resolution).
    Data(Json),

    /// Writable composite view into the owning node's backing.
    Live(LiveView),

    /// Read-only composite view.
    Frozen(FrozenView),

    /// A callable.
    Function(ContextFn),

    /// A linked context (built-in `root`/`parent` reads).
    Context(Context),

    /// Marker for a built-in method resolved by name.
    Method(BuiltIn),
}

impl Value {
    pub fn data(value: impl Into<Json>) -> Value {
        Value::Data(value.into())
    }

    pub fn function(
        f: impl Fn(&Context, &[Json]) -> Result<Json> + Send + Sync + 'static,
    ) -> Value {
        Value::Function(ContextFn::new(f))
    }

    /// Materialize the value as plain JSON, if it carries data.
    pub fn as_json(&self) -> Option<Json> {
        match self {
            Value::Data(value) => Some(value.clone()),
            Value::Live(view) => Some(view.to_value()),
            Value::Frozen(view) => Some(view.to_value()),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&ContextFn> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Context> {
        match self {
            Value::Context(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn as_frozen(&self) -> Option<&FrozenView> {
        match self {
            Value::Frozen(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_live(&self) -> Option<&LiveView> {
        match self {
            Value::Live(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Context(a), Value::Context(b)) => a.ptr_eq(b),
            (Value::Method(a), Value::Method(b)) => a == b,
            (a, b) => match (a.as_json(), b.as_json()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl From<Json> for Value {
    fn from(value: Json) -> Value {
        Value::Data(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Data(Json::String(value.to_string()))
    }
}

impl From<ContextFn> for Value {
    fn from(f: ContextFn) -> Value {
        Value::Function(f)
    }
}

impl From<FrozenView> for Value {
    fn from(view: FrozenView) -> Value {
        Value::Frozen(view)
    }
}

/// Construction-time options for a context node.
///
/// The flags fix the node's resolution behavior for its lifetime.
#[derive(Clone)]
pub struct ContextOptions {
    /// Invoked with the new state and the optional reason after every
    /// successful `set_state`.
    pub on_state_change: Option<StateChangeHook>,

    /// Expose the reserved accessor names (`root`, `parent`, `state`,
    /// `decorate`, `snapshot`/`clone`, `set_state`) through the key space.
    pub built_in_methods: bool,

    /// Write-protect non-root nodes and freeze their inherited composite
    /// reads.
    pub freeze: bool,

    /// Initial state mapping. Must be object-like when present.
    pub state: Option<Json>,

    /// Graft this node onto an existing tree while keeping its own backing.
    /// Only honored for plain-mapping (root-style) construction.
    pub parent: Option<Context>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            on_state_change: None,
            built_in_methods: true,
            freeze: true,
            state: None,
            parent: None,
        }
    }
}

impl fmt::Debug for ContextOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextOptions")
            .field("built_in_methods", &self.built_in_methods)
            .field("freeze", &self.freeze)
            .field("state", &self.state)
            .field("has_on_state_change", &self.on_state_change.is_some())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
