//! State slot implementation.

use crate::error::{kind_of, ContextError, Result};
use crate::types::StateChangeHook;
use crate::views::FrozenView;
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Label carried by every state view and its setter diagnostics.
const STATE_LABEL: &str = "state";

/// Holds the current immutable state snapshot for one context node.
///
/// The snapshot is replaced wholesale on every `set` and is only ever
/// handed out behind a [`FrozenView`]; the previous snapshot is discarded.
pub struct StateStore {
    current: RwLock<Arc<Json>>,
    version: AtomicU64,
    hook: Option<StateChangeHook>,
}

impl StateStore {
    /// Create a slot from an optional initial mapping.
    pub(crate) fn new(initial: Option<Json>, hook: Option<StateChangeHook>) -> Result<Self> {
        let initial = match initial {
            Some(Json::Object(map)) => Json::Object(map),
            Some(other) => return Err(ContextError::InvalidState(kind_of(&other).to_string())),
            None => Json::Object(serde_json::Map::new()),
        };

        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
            hook,
        })
    }

    /// Current snapshot.
    pub fn get(&self) -> FrozenView {
        FrozenView::new(Arc::clone(&self.current.read()), STATE_LABEL)
    }

    /// Number of replacements so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Replace the snapshot with `{...previous, ...patch}`.
    ///
    /// The merge and swap happen under one write lock so readers never see
    /// a partial merge; the hook runs after the lock is released.
    pub(crate) fn set(&self, patch: Json, reason: Option<&str>) -> Result<(FrozenView, u64)> {
        let patch = match patch {
            Json::Object(map) => map,
            other => return Err(ContextError::InvalidState(kind_of(&other).to_string())),
        };

        let (snapshot, version) = {
            let mut current = self.current.write();
            let mut merged = current.as_object().cloned().unwrap_or_default();
            merged.extend(patch);
            let snapshot = Arc::new(Json::Object(merged));
            *current = Arc::clone(&snapshot);
            let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
            (snapshot, version)
        };

        let view = FrozenView::new(snapshot, STATE_LABEL);
        if let Some(hook) = &self.hook {
            hook(&view, reason);
        }
        Ok((view, version))
    }
}
