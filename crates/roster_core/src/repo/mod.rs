//! Repository facade over the user store.
//!
//! # Responsibility
//! - Expose verb-named operations to callers (UI, CLI, async facade).
//! - Decouple callers from the concrete storage engine.
//!
//! # Invariants
//! - Repository calls delegate 1:1 to store primitives.
//! - No validation, batching or caching happens here; errors pass through unchanged.

pub mod user_repo;
