//! User use-case service.
//!
//! # Responsibility
//! - Provide the validating entry points a form-driven caller uses.
//! - Delegate persistence to the repository.
//!
//! # Invariants
//! - Validation errors are raised here, before any storage call.
//! - Storage errors are returned unchanged.

use crate::model::user::{parse_age, User, UserId, UserValidationError};
use crate::repo::user_repo::UserRepository;
use crate::store::user_store::{StoreError, UserStore};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by validating service calls.
#[derive(Debug)]
pub enum ServiceError {
    Validation(UserValidationError),
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<UserValidationError> for ServiceError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Validating wrapper for user operations.
pub struct UserService<S: UserStore> {
    repo: UserRepository<S>,
}

impl<S: UserStore> UserService<S> {
    /// Creates a service over the provided repository.
    pub fn new(repo: UserRepository<S>) -> Self {
        Self { repo }
    }

    /// Registers a new user from raw form values.
    ///
    /// # Contract
    /// - `age` is parsed from text; empty, non-numeric or negative input is rejected.
    /// - Returns the persisted user with its assigned id.
    pub fn register(
        &self,
        first_name: &str,
        last_name: &str,
        age: &str,
    ) -> ServiceResult<User> {
        let user = User::new(first_name, last_name, parse_age(age)?)?;
        Ok(self.repo.insert(&user)?)
    }

    /// Saves an edited record: inserts when `id == 0`, updates otherwise.
    ///
    /// For updates the submitted record is returned; an id without a stored
    /// row is not reported as an error.
    pub fn save(&self, user: &User) -> ServiceResult<User> {
        user.validate()?;
        if user.is_new() {
            return Ok(self.repo.insert(user)?);
        }
        self.repo.update(user)?;
        Ok(user.clone())
    }

    /// Lists all users.
    pub fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.get_all()?)
    }

    /// Removes a user by id and returns removed row count.
    pub fn remove(&self, id: UserId) -> ServiceResult<usize> {
        Ok(self.repo.delete_by_id(id)?)
    }

    /// Loads one user by id.
    pub fn get(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.repo.get(id)?)
    }

    /// Returns the wrapped repository.
    pub fn repository(&self) -> &UserRepository<S> {
        &self.repo
    }
}
