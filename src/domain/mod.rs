//! Domain layer: entities, validation and repository contracts.
//!
//! Nothing in here knows about files or databases.
//!
//! # Architecture
//!
//! - [`entities`] - `Client`, `Security`, `Investment` and their short projections
//! - [`validation`] - field validators shared by entities and forms
//! - [`pagination`] - one-indexed page arithmetic
//! - [`repositories`] - the [`repositories::Repository`] contract, the filtering
//!   decorator and list queries
//!
//! Storage backends live in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod pagination;
pub mod repositories;
pub mod validation;
