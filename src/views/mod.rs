//! Composite-value views.
//!
//! Reads against a context hand back views rather than references: a
//! [`LiveView`] resolves against the owning node's backing on every access
//! and writes back into it, while a [`FrozenView`] shields an immutable
//! snapshot and rejects every write with the dotted access path.

mod frozen;
mod live;

pub use frozen::{freeze, FrozenView};
pub use live::LiveView;

use serde_json::Value as Json;

/// One step of an access path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

/// Follow a path into a JSON document.
pub(crate) fn walk<'a>(root: &'a Json, path: &[Segment]) -> Option<&'a Json> {
    let mut node = root;
    for segment in path {
        node = match segment {
            Segment::Key(key) => node.as_object()?.get(key)?,
            Segment::Index(idx) => node.as_array()?.get(*idx)?,
        };
    }
    Some(node)
}

/// Follow a path into a JSON document, mutably.
pub(crate) fn walk_mut<'a>(root: &'a mut Json, path: &[Segment]) -> Option<&'a mut Json> {
    let mut node = root;
    for segment in path {
        node = match segment {
            Segment::Key(key) => node.as_object_mut()?.get_mut(key)?,
            Segment::Index(idx) => node.as_array_mut()?.get_mut(*idx)?,
        };
    }
    Some(node)
}

/// Render a dotted access path for diagnostics.
pub(crate) fn dotted(label: &str, path: &[Segment]) -> String {
    let mut out = String::from(label);
    for segment in path {
        out.push('.');
        match segment {
            Segment::Key(key) => out.push_str(key),
            Segment::Index(idx) => out.push_str(&idx.to_string()),
        }
    }
    out
}
