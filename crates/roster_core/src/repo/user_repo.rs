//! User repository.
//!
//! # Responsibility
//! - Map caller verbs (`insert`, `get_all`, `delete_by_id`, `update`) onto store primitives.
//!
//! # Invariants
//! - Every call is a single store primitive and inherits its atomicity.

use crate::model::user::{User, UserId};
use crate::store::user_store::{StoreResult, UserStore};

/// Public facade for user persistence, generic over the storage engine.
pub struct UserRepository<S: UserStore> {
    store: S,
}

impl<S: UserStore> UserRepository<S> {
    /// Creates a repository over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists `user`; pass `id == 0` for new entries.
    ///
    /// Returns the persisted record with its assigned id. An existing id is
    /// replaced rather than rejected.
    pub fn insert(&self, user: &User) -> StoreResult<User> {
        self.store.put(user)
    }

    /// Returns all persisted users. Order is unspecified.
    pub fn get_all(&self) -> StoreResult<Vec<User>> {
        self.store.list_all()
    }

    /// Deletes by id and returns the number of removed rows.
    pub fn delete_by_id(&self, id: UserId) -> StoreResult<usize> {
        self.store.delete_by_id(id)
    }

    /// Overwrites the record with `user.id`.
    ///
    /// An id with no matching row is a silent no-op.
    pub fn update(&self, user: &User) -> StoreResult<()> {
        self.store.update(user)
    }

    /// Loads one user by id.
    pub fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        self.store.get_by_id(id)
    }
}
