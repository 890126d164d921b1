//! Named extensions attached to a single context node.
//!
//! A decorator is visible to the node it was registered on and to its
//! descendants, never to the parent or siblings. Object-typed decorators
//! are frozen at registration time, so they read the same through every
//! node regardless of its freeze flag.

mod registry;

pub use registry::DecoratorRegistry;
