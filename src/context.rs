//! Context nodes and the read/write resolution protocol.
//!
//! A [`Context`] is a cheap-to-clone handle onto one node. A root node owns
//! the caller-supplied backing mapping; a snapshot node wraps an empty
//! backing and resolves misses through its parent chain. Resolution order
//! for a read is fixed: own decorators, then built-in names (when enabled),
//! then the own backing, then the parent's public view. Writes are only
//! legal against the own backing, and under `freeze` only on the root.

use crate::decorators::DecoratorRegistry;
use crate::error::{kind_of, ContextError, Result};
use crate::state::StateStore;
use crate::subscriptions::{
    ContextEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{BuiltIn, ContextMap, ContextOptions, Value};
use crate::views::{freeze, FrozenView, LiveView};
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a node is constructed from.
///
/// The factory distinguishes chained construction (the source is an existing
/// context) from root construction (the source is a plain mapping). The
/// distinction is carried by the type, not inferred from shape.
pub enum Source {
    /// Plain backing mapping: the node becomes a root (unless grafted via
    /// [`ContextOptions::parent`]).
    Object(ContextMap),

    /// Existing context: the node becomes a child with an empty backing.
    Context(Context),
}

impl Source {
    /// Build a root source from a JSON value.
    ///
    /// Fails with `InvalidSource` unless the value is an object.
    pub fn json(value: Json) -> Result<Source> {
        match value {
            Json::Object(map) => Ok(Source::Object(
                map.into_iter().map(|(k, v)| (k, Value::Data(v))).collect(),
            )),
            other => Err(ContextError::InvalidSource(kind_of(&other).to_string())),
        }
    }
}

impl From<ContextMap> for Source {
    fn from(map: ContextMap) -> Source {
        Source::Object(map)
    }
}

impl From<Context> for Source {
    fn from(ctx: Context) -> Source {
        Source::Context(ctx)
    }
}

impl From<&Context> for Source {
    fn from(ctx: &Context) -> Source {
        Source::Context(ctx.clone())
    }
}

/// Where a resolved value came from, for the freeze rule.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ResolvedFrom {
    Decorator,
    BuiltIn,
    Backing,
}

struct Node {
    /// Own properties. Roots take the caller's mapping, children start empty.
    backing: RwLock<ContextMap>,

    /// Named extensions private to this node.
    decorators: RwLock<DecoratorRegistry>,

    /// Node-local state slot. Never inherited.
    state: StateStore,

    /// Event subscribers for this node.
    subscriptions: SubscriptionManager,

    /// The node this one was snapshotted from (or grafted onto).
    parent: Option<Context>,

    built_in_methods: bool,
    freeze: bool,

    /// Construction options, used as the defaults for `snapshot`.
    opts: ContextOptions,
}

/// A context node. Handles are cheap to clone and share one node.
#[derive(Clone)]
pub struct Context {
    node: Arc<Node>,
}

impl Context {
    /// Construct a node.
    ///
    /// A [`Source::Context`] produces a child with an empty backing linked
    /// to the given node. A [`Source::Object`] produces a root owning the
    /// mapping, unless `opts.parent` is set, in which case the node keeps
    /// the mapping as its own backing but joins the given node's tree.
    pub fn new(source: impl Into<Source>, opts: ContextOptions) -> Result<Context> {
        let (backing, parent) = match source.into() {
            Source::Context(parent) => (ContextMap::new(), Some(parent)),
            Source::Object(map) => (map, opts.parent.clone()),
        };

        let state = StateStore::new(opts.state.clone(), opts.on_state_change.clone())?;

        let ctx = Context {
            node: Arc::new(Node {
                backing: RwLock::new(backing),
                decorators: RwLock::new(DecoratorRegistry::new()),
                state,
                subscriptions: SubscriptionManager::new(),
                parent,
                built_in_methods: opts.built_in_methods,
                freeze: opts.freeze,
                opts,
            }),
        };

        debug!(is_root = ctx.is_root(), "context created");
        Ok(ctx)
    }

    /// Construct a root from a JSON object value.
    pub fn from_json(value: Json, opts: ContextOptions) -> Result<Context> {
        Context::new(Source::json(value)?, opts)
    }

    /// The top-most ancestor; a root returns itself.
    pub fn root(&self) -> Context {
        let mut current = self.clone();
        while let Some(parent) = current.node.parent.clone() {
            current = parent;
        }
        current
    }

    /// The node this one was snapshotted from, or `None` for a root.
    pub fn parent(&self) -> Option<Context> {
        self.node.parent.clone()
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Handle identity: do both handles share one node?
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// The options this node was constructed with.
    pub fn options(&self) -> &ContextOptions {
        &self.node.opts
    }

    /// Current state snapshot.
    pub fn state(&self) -> FrozenView {
        self.node.state.get()
    }

    /// Number of state replacements on this node.
    pub fn state_version(&self) -> u64 {
        self.node.state.version()
    }

    /// Read a property through the resolution protocol.
    pub fn get(&self, key: &str) -> Option<Value> {
        let (value, from) = self.resolve(key)?;
        Some(match from {
            ResolvedFrom::Backing => self.apply_freeze(value, key),
            _ => value,
        })
    }

    /// Read a property and materialize it as plain JSON.
    pub fn get_json(&self, key: &str) -> Option<Json> {
        self.get(key).and_then(|value| value.as_json())
    }

    /// Is `key` resolvable on this node (decorators, built-ins, backing or
    /// the parent chain)?
    pub fn has(&self, key: &str) -> bool {
        if self.node.decorators.read().has(key) {
            return true;
        }
        if self.node.built_in_methods && BuiltIn::from_name(key).is_some() {
            return true;
        }
        if self.node.backing.read().contains_key(key) {
            return true;
        }
        self.node.parent.as_ref().map_or(false, |p| p.has(key))
    }

    /// Write a property into this node's backing.
    ///
    /// Decorator names and enabled built-in names are never writable, and
    /// under `freeze` only the root may write at all.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if self.node.decorators.read().has(&key) {
            return Err(ContextError::InvalidSetter(format!("ctx.{key}")));
        }
        if self.node.built_in_methods && BuiltIn::from_name(&key).is_some() {
            return Err(ContextError::InvalidSetter(format!("ctx.{key}")));
        }
        if self.node.freeze && !self.is_root() {
            return Err(ContextError::InvalidSetter(format!("ctx.{key}")));
        }
        self.node.backing.write().insert(key, value.into());
        Ok(())
    }

    /// Resolve a function-typed property and invoke it with this context.
    pub fn call(&self, key: &str, args: &[Json]) -> Result<Json> {
        match self.get(key) {
            Some(Value::Function(f)) => f.call(self, args),
            Some(_) => Err(ContextError::NotCallable(key.to_string())),
            None => Err(ContextError::NotFound(key.to_string())),
        }
    }

    /// Attach a named extension without touching the parent chain.
    ///
    /// Object-typed decorators are frozen at registration time, so they
    /// read the same through every node regardless of its freeze flag.
    /// Names already present on this node, or present as own properties of
    /// the root's backing, are rejected.
    pub fn decorate(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<&Self> {
        let name = name.into();

        {
            let mut decorators = self.node.decorators.write();
            if decorators.has(&name) {
                return Err(ContextError::DecoratorAlreadyPresent(name));
            }
            if self.root().with_backing(|backing| backing.contains_key(&name)) {
                return Err(ContextError::OverwritesContextProperty(name));
            }
            let value = match value.into() {
                Value::Data(json) if json.is_object() || json.is_array() => {
                    freeze(json, format!("ctx.{name}"))
                }
                other => other,
            };
            decorators.insert(name.clone(), value)?;
        }

        debug!(decorator = %name, "context decorated");
        self.node
            .subscriptions
            .broadcast(ContextEvent::Decorated { name });
        Ok(self)
    }

    /// Replace the state snapshot (shallow merge, patch keys win).
    ///
    /// Invokes the node's change hook and broadcasts a `StateChanged`
    /// event after the swap. A rejected patch leaves the prior state and
    /// triggers neither.
    pub fn set_state(&self, patch: Json, reason: Option<&str>) -> Result<FrozenView> {
        let (state, version) = self.node.state.set(patch, reason)?;
        debug!(version, "state replaced");
        self.node.subscriptions.broadcast(ContextEvent::StateChanged {
            state: state.clone(),
            version,
            reason: reason.map(String::from),
        });
        Ok(state)
    }

    /// Derive a child wrapping an empty backing and linking back here.
    ///
    /// Omitted options default to this node's construction options with
    /// `state` and `parent` cleared: a child's state always starts empty,
    /// and a graft link never propagates.
    pub fn snapshot(&self, opts: Option<ContextOptions>) -> Result<Context> {
        let opts = opts.unwrap_or_else(|| ContextOptions {
            state: None,
            parent: None,
            ..self.node.opts.clone()
        });
        Context::new(Source::Context(self.clone()), opts)
    }

    /// Observe this node's state replacements and decorations.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.node.subscriptions.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.node.subscriptions.unsubscribe(id);
    }

    pub(crate) fn with_backing<R>(&self, f: impl FnOnce(&ContextMap) -> R) -> R {
        f(&self.node.backing.read())
    }

    pub(crate) fn with_backing_mut<R>(&self, f: impl FnOnce(&mut ContextMap) -> R) -> R {
        f(&mut self.node.backing.write())
    }

    /// Resolution steps 2-4, tagging where the value came from so the
    /// freeze rule can be applied per delegating node.
    fn resolve(&self, key: &str) -> Option<(Value, ResolvedFrom)> {
        {
            let decorators = self.node.decorators.read();
            if let Some(value) = decorators.get(key) {
                return Some((value.clone(), ResolvedFrom::Decorator));
            }
        }

        if self.node.built_in_methods {
            if let Some(built_in) = BuiltIn::from_name(key) {
                return Some((self.built_in_value(built_in), ResolvedFrom::BuiltIn));
            }
        }

        {
            let backing = self.node.backing.read();
            if let Some(entry) = backing.get(key) {
                let value = match entry {
                    Value::Data(json) if json.is_object() || json.is_array() => {
                        Value::Live(LiveView::new(self.clone(), key))
                    }
                    other => other.clone(),
                };
                return Some((value, ResolvedFrom::Backing));
            }
        }

        let parent = self.node.parent.as_ref()?;
        let (value, from) = parent.resolve(key)?;
        // The parent's own freeze policy applies before the value crosses
        // down; decorators and built-ins are never re-wrapped.
        let value = if from == ResolvedFrom::Backing {
            parent.apply_freeze(value, key)
        } else {
            value
        };
        Some((value, from))
    }

    /// Resolution step 5: freeze composite backing reads on non-root nodes
    /// with `freeze` enabled. Idempotent on already-frozen values.
    fn apply_freeze(&self, value: Value, key: &str) -> Value {
        if !self.node.freeze || self.node.parent.is_none() {
            return value;
        }
        match value {
            Value::Live(view) => Value::Frozen(FrozenView::new(
                Arc::new(view.to_value()),
                format!("ctx.{key}"),
            )),
            Value::Data(json) if json.is_object() || json.is_array() => {
                freeze(json, format!("ctx.{key}"))
            }
            other => other,
        }
    }

    fn built_in_value(&self, built_in: BuiltIn) -> Value {
        match built_in {
            BuiltIn::Root => Value::Context(self.root()),
            BuiltIn::Parent => match &self.node.parent {
                Some(parent) => Value::Context(parent.clone()),
                None => Value::Data(Json::Null),
            },
            BuiltIn::State => Value::Frozen(self.node.state.get()),
            BuiltIn::Decorate | BuiltIn::Snapshot | BuiltIn::SetState => Value::Method(built_in),
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("is_root", &self.is_root())
            .field("decorators", &self.node.decorators.read().len())
            .field("state_version", &self.state_version())
            .finish()
    }
}
