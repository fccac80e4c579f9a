//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - file and PostgreSQL repository implementations
//! - [`database`] - connection pool setup, migrations and shutdown
//! - [`factory`] - picks a backend by name and builds the repositories

pub mod database;
pub mod factory;
pub mod persistence;
