//! User domain model.
//!
//! # Responsibility
//! - Define the canonical `User` record persisted in the `users` table.
//! - Provide validating constructors for the application boundary.
//!
//! # Invariants
//! - `id` is `0` for new records and positive once persisted.
//! - `age` is never negative for records built through `new`/`with_id`.
//! - Names are non-empty after trimming for records built through `new`/`with_id`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer identifier assigned by the store.
pub type UserId = i64;

/// Sentinel id carried by records that have not been persisted yet.
pub const NEW_USER_ID: UserId = 0;

/// Validation failures raised at the application boundary.
///
/// Storage never raises these; the store persists whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyFirstName,
    EmptyLastName,
    NegativeAge(i32),
    NegativeId(UserId),
    /// Age input that is not a non-negative integer.
    InvalidAge(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::NegativeAge(age) => write!(f, "age ({age}) must be >= 0"),
            Self::NegativeId(id) => write!(f, "id ({id}) must be >= 0"),
            Self::InvalidAge(input) => {
                write!(f, "age input `{input}` is not a non-negative integer")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Canonical user record.
///
/// Serialized with the same camelCase names used by the `users` table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// `0` until the store assigns an identifier.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

impl User {
    /// Creates a new, not yet persisted record.
    ///
    /// # Errors
    /// - Returns a validation error for empty names or a negative age.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: i32,
    ) -> Result<Self, UserValidationError> {
        Self::with_id(NEW_USER_ID, first_name, last_name, age)
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used by edit flows where the record was loaded from the store earlier.
    ///
    /// # Errors
    /// - Returns a validation error for a negative id, empty names or a negative age.
    pub fn with_id(
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: i32,
    ) -> Result<Self, UserValidationError> {
        let user = Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        };
        user.validate()?;
        Ok(user)
    }

    /// Validates field-level invariants.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.id < 0 {
            return Err(UserValidationError::NegativeId(self.id));
        }
        if self.first_name.trim().is_empty() {
            return Err(UserValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(UserValidationError::EmptyLastName);
        }
        if self.age < 0 {
            return Err(UserValidationError::NegativeAge(self.age));
        }
        Ok(())
    }

    /// Returns whether the store still has to assign an id.
    pub fn is_new(&self) -> bool {
        self.id == NEW_USER_ID
    }

    /// Returns a copy carrying the given id and the same field values.
    pub fn with_assigned_id(&self, id: UserId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// Parses age text coming from a form field.
///
/// Accepts surrounding whitespace; rejects empty, non-numeric and negative input.
pub fn parse_age(input: &str) -> Result<i32, UserValidationError> {
    let trimmed = input.trim();
    match trimmed.parse::<i32>() {
        Ok(age) if age >= 0 => Ok(age),
        _ => Err(UserValidationError::InvalidAge(trimmed.to_string())),
    }
}
