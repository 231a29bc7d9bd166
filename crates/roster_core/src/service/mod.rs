//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input before it reaches the repository.
//! - Offer a suspending (async) variant of the repository verbs.

pub mod async_service;
pub mod user_service;
