//! Suspending facade over the user repository.
//!
//! # Responsibility
//! - Run blocking repository calls on the tokio blocking pool.
//! - Return futures so async callers never block their executor thread.
//!
//! # Invariants
//! - Each call is one repository call; serialization is provided by the store.
//! - A worker that panics or is cancelled surfaces as `StoreError::WorkerFailed`.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::store::user_store::{StoreError, StoreResult, UserStore};
use std::sync::Arc;

/// Async wrapper sharing one repository across tasks.
pub struct AsyncUserService<S: UserStore> {
    repo: Arc<UserRepository<S>>,
}

impl<S: UserStore> Clone for AsyncUserService<S> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<S> AsyncUserService<S>
where
    S: UserStore + Send + Sync + 'static,
{
    pub fn new(repo: UserRepository<S>) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// See [`UserRepository::insert`].
    pub async fn insert(&self, user: User) -> StoreResult<User> {
        self.run(move |repo| repo.insert(&user)).await
    }

    /// See [`UserRepository::get_all`].
    pub async fn get_all(&self) -> StoreResult<Vec<User>> {
        self.run(|repo| repo.get_all()).await
    }

    /// See [`UserRepository::delete_by_id`].
    pub async fn delete_by_id(&self, id: UserId) -> StoreResult<usize> {
        self.run(move |repo| repo.delete_by_id(id)).await
    }

    /// See [`UserRepository::update`].
    pub async fn update(&self, user: User) -> StoreResult<()> {
        self.run(move |repo| repo.update(&user)).await
    }

    /// See [`UserRepository::get`].
    pub async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        self.run(move |repo| repo.get(id)).await
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&UserRepository<S>) -> StoreResult<T> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || op(repo.as_ref()))
            .await
            .map_err(|err| StoreError::WorkerFailed(err.to_string()))?
    }
}
