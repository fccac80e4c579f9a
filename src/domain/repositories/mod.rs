//! Repository contract for the domain layer.
//!
//! [`Repository`] is implemented by the storage backends in
//! `crate::infrastructure::persistence` and by [`FilteredRepository`], which
//! wraps any of them to add filtering and sorting. Loads and mutations are
//! announced as [`RepositoryEvent`]s to anyone who subscribed.
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod events;
pub mod filtered_repository;
pub mod query;
pub mod repository;

pub use events::{EVENT_CAPACITY, EventBus, RepositoryEvent};
pub use filtered_repository::{FilteredRepository, KeyFn, Predicate, filter_and_sort};
pub use query::{ClientQuery, InvestmentQuery, ListQuery, SecurityQuery, SortKey};
pub use repository::Repository;
