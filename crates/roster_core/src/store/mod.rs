//! Storage engine boundary for user records.
//!
//! # Responsibility
//! - Own the `users` table and its connection exclusively.
//! - Assign identifiers and resolve id conflicts with replace semantics.
//!
//! # Invariants
//! - Every primitive is one atomic unit of work.
//! - Writes are serialized; reads observe every completed write.
//! - The store never validates field values.

pub mod user_store;
