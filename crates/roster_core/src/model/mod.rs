//! Domain model for roster records.
//!
//! # Responsibility
//! - Define the `User` record shared by store, repository and callers.
//! - Keep field-level validation next to the record definition.
//!
//! # Invariants
//! - `id == 0` means "not yet persisted"; persisted records have `id > 0`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod user;
