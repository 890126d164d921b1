//! Writable composite views bound to a node's backing.

use super::{dotted, walk, walk_mut, Segment};
use crate::context::Context;
use crate::error::{ContextError, Result};
use crate::types::Value;
use serde_json::Value as Json;
use std::fmt;

/// Writable view into a composite property of a node's backing.
///
/// The view resolves against the owning node's backing on every access, so
/// it always reflects the current value; writes go back into the backing.
/// Live views are only handed out where direct mutation is legal (the root,
/// or nodes constructed with `freeze` disabled).
#[derive(Clone)]
pub struct LiveView {
    owner: Context,
    /// First segment names the backing property.
    path: Vec<Segment>,
}

impl LiveView {
    pub(crate) fn new(owner: Context, property: &str) -> Self {
        LiveView {
            owner,
            path: vec![Segment::Key(property.to_string())],
        }
    }

    fn child(&self, segment: Segment) -> LiveView {
        let mut path = self.path.clone();
        path.push(segment);
        LiveView {
            owner: self.owner.clone(),
            path,
        }
    }

    /// Run `f` over the current JSON node, or `None` if the path no longer
    /// resolves to plain data in the owner's backing.
    fn with_node<R>(&self, f: impl FnOnce(&Json) -> R) -> Option<R> {
        let (first, rest) = self.path.split_first()?;
        let key = match first {
            Segment::Key(key) => key,
            Segment::Index(_) => return None,
        };
        self.owner.with_backing(|backing| {
            let entry = match backing.get(key) {
                Some(Value::Data(json)) => json,
                _ => return None,
            };
            walk(entry, rest).map(f)
        })
    }

    /// Dotted access path of this view, e.g. `ctx.human`.
    pub fn path(&self) -> String {
        dotted("ctx", &self.path)
    }

    /// Read a key of an object node. Composite results stay live.
    pub fn get(&self, key: &str) -> Option<Value> {
        enum Found {
            Composite,
            Scalar(Json),
        }

        let found = self.with_node(|node| {
            let child = node.as_object()?.get(key)?;
            Some(if child.is_object() || child.is_array() {
                Found::Composite
            } else {
                Found::Scalar(child.clone())
            })
        })??;

        Some(match found {
            Found::Composite => Value::Live(self.child(Segment::Key(key.to_string()))),
            Found::Scalar(value) => Value::Data(value),
        })
    }

    /// Read an element of an array node. Composite results stay live.
    pub fn index(&self, idx: usize) -> Option<Value> {
        enum Found {
            Composite,
            Scalar(Json),
        }

        let found = self.with_node(|node| {
            let child = node.as_array()?.get(idx)?;
            Some(if child.is_object() || child.is_array() {
                Found::Composite
            } else {
                Found::Scalar(child.clone())
            })
        })??;

        Some(match found {
            Found::Composite => Value::Live(self.child(Segment::Index(idx))),
            Found::Scalar(value) => Value::Data(value),
        })
    }

    /// Read a key and materialize it as plain JSON.
    pub fn get_json(&self, key: &str) -> Option<Json> {
        self.with_node(|node| node.as_object()?.get(key).cloned())
            .flatten()
    }

    /// Write a key into the underlying object node.
    pub fn set(&self, key: &str, value: Json) -> Result<()> {
        let path = format!("{}.{}", self.path(), key);
        let (first, rest) = match self.path.split_first() {
            Some(split) => split,
            None => return Err(ContextError::InvalidSetter(path)),
        };
        let root_key = match first {
            Segment::Key(key) => key.clone(),
            Segment::Index(_) => return Err(ContextError::InvalidSetter(path)),
        };

        self.owner.with_backing_mut(|backing| {
            let entry = match backing.get_mut(&root_key) {
                Some(Value::Data(json)) => json,
                _ => return Err(ContextError::InvalidSetter(path.clone())),
            };
            let node = match walk_mut(entry, rest) {
                Some(node) => node,
                None => return Err(ContextError::InvalidSetter(path.clone())),
            };
            match node.as_object_mut() {
                Some(map) => {
                    map.insert(key.to_string(), value);
                    Ok(())
                }
                None => Err(ContextError::InvalidSetter(path.clone())),
            }
        })
    }

    /// Remove a key from the underlying object node.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = format!("{}.{}", self.path(), key);
        let (first, rest) = match self.path.split_first() {
            Some(split) => split,
            None => return Err(ContextError::InvalidSetter(path)),
        };
        let root_key = match first {
            Segment::Key(key) => key.clone(),
            Segment::Index(_) => return Err(ContextError::InvalidSetter(path)),
        };

        self.owner.with_backing_mut(|backing| {
            let entry = match backing.get_mut(&root_key) {
                Some(Value::Data(json)) => json,
                _ => return Err(ContextError::InvalidSetter(path.clone())),
            };
            let node = match walk_mut(entry, rest) {
                Some(node) => node,
                None => return Err(ContextError::InvalidSetter(path.clone())),
            };
            match node.as_object_mut() {
                Some(map) => {
                    map.remove(key);
                    Ok(())
                }
                None => Err(ContextError::InvalidSetter(path.clone())),
            }
        })
    }

    /// Clone the current value out as plain JSON.
    pub fn to_value(&self) -> Json {
        self.with_node(Json::clone).unwrap_or(Json::Null)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.with_node(|node| {
            node.as_object()
                .map_or(false, |map| map.contains_key(key))
        })
        .unwrap_or(false)
    }

    /// Keys of the current node, for object nodes.
    pub fn keys(&self) -> Vec<String> {
        self.with_node(|node| {
            node.as_object()
                .map_or_else(Vec::new, |map| map.keys().cloned().collect())
        })
        .unwrap_or_default()
    }

    /// Number of entries (object) or elements (array) of the current node.
    pub fn len(&self) -> usize {
        self.with_node(|node| match node {
            Json::Object(map) => map.len(),
            Json::Array(items) => items.len(),
            _ => 0,
        })
        .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for LiveView {
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}

impl fmt::Debug for LiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveView")
            .field("path", &self.path())
            .field("value", &self.to_value())
            .finish()
    }
}
