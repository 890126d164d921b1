//! Read-only, lazily recursive views over composite snapshots.

use super::{dotted, walk, Segment};
use crate::error::{ContextError, Result};
use crate::types::Value;
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

static NULL: Json = Json::Null;

/// Read-only view over a composite snapshot.
///
/// Nested composite reads return further `FrozenView`s (wrapping happens on
/// access, not eagerly at construction), and every write fails with
/// `InvalidSetter` carrying the dotted access path. The view never mutates
/// the underlying snapshot, and reading the same key twice yields
/// structurally equal views.
#[derive(Clone)]
pub struct FrozenView {
    doc: Arc<Json>,
    label: String,
    path: Vec<Segment>,
}

impl FrozenView {
    pub(crate) fn new(doc: Arc<Json>, label: impl Into<String>) -> Self {
        FrozenView {
            doc,
            label: label.into(),
            path: Vec::new(),
        }
    }

    fn child(&self, segment: Segment) -> FrozenView {
        let mut path = self.path.clone();
        path.push(segment);
        FrozenView {
            doc: Arc::clone(&self.doc),
            label: self.label.clone(),
            path,
        }
    }

    fn node(&self) -> &Json {
        walk(&self.doc, &self.path).unwrap_or(&NULL)
    }

    fn resolve(&self, child: &Json, segment: Segment) -> Value {
        if child.is_object() || child.is_array() {
            Value::Frozen(self.child(segment))
        } else {
            Value::Data(child.clone())
        }
    }

    /// Dotted access path of this view, e.g. `state.bro`.
    pub fn path(&self) -> String {
        dotted(&self.label, &self.path)
    }

    /// Read a key of an object node. Composite results stay wrapped.
    pub fn get(&self, key: &str) -> Option<Value> {
        let child = self.node().as_object()?.get(key)?;
        Some(self.resolve(child, Segment::Key(key.to_string())))
    }

    /// Read an element of an array node. Composite results stay wrapped.
    pub fn index(&self, idx: usize) -> Option<Value> {
        let child = self.node().as_array()?.get(idx)?;
        Some(self.resolve(child, Segment::Index(idx)))
    }

    /// Read a key and materialize it as plain JSON.
    pub fn get_json(&self, key: &str) -> Option<Json> {
        self.node().as_object()?.get(key).cloned()
    }

    /// Writes through a frozen view always fail.
    pub fn set(&self, key: &str, _value: Json) -> Result<()> {
        Err(ContextError::InvalidSetter(format!(
            "{}.{}",
            self.path(),
            key
        )))
    }

    /// Deletes through a frozen view always fail.
    pub fn remove(&self, key: &str) -> Result<()> {
        Err(ContextError::InvalidSetter(format!(
            "{}.{}",
            self.path(),
            key
        )))
    }

    /// Clone the shielded value out as plain JSON.
    pub fn to_value(&self) -> Json {
        self.node().clone()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.node()
            .as_object()
            .map_or(false, |map| map.contains_key(key))
    }

    /// Keys of the current node, for object nodes.
    pub fn keys(&self) -> Vec<String> {
        self.node()
            .as_object()
            .map_or_else(Vec::new, |map| map.keys().cloned().collect())
    }

    /// Number of entries (object) or elements (array) of the current node.
    pub fn len(&self) -> usize {
        match self.node() {
            Json::Object(map) => map.len(),
            Json::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for FrozenView {
    fn eq(&self, other: &Self) -> bool {
        self.node() == other.node()
    }
}

impl fmt::Debug for FrozenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenView")
            .field("path", &self.path())
            .field("value", self.node())
            .finish()
    }
}

impl Serialize for FrozenView {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}

/// Wrap a value for read-only access.
///
/// Non-composite values pass through unchanged; composites become a
/// `FrozenView` rooted at `label`.
pub fn freeze(value: Json, label: impl Into<String>) -> Value {
    if value.is_object() || value.is_array() {
        Value::Frozen(FrozenView::new(Arc::new(value), label))
    } else {
        Value::Data(value)
    }
}
