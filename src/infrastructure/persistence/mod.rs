//! Repository implementations.
//!
//! # Repositories
//!
//! - [`FileRepository`] - one JSON or YAML file per entity type
//! - [`PgRepository`] - one PostgreSQL table per entity type, via SQLx
//!
//! Both implement [`crate::domain::repositories::Repository`] for every
//! entity that has a [`PgEntity`] row mapping.

pub mod file_format;
pub mod file_repository;
pub mod pg_entity;
pub mod pg_repository;

pub use file_format::FileFormat;
pub use file_repository::{FileRepository, write_collection};
pub use pg_entity::PgEntity;
pub use pg_repository::PgRepository;
