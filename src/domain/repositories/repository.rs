//! Storage-independent repository contract.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::RepositoryEvent;
use crate::domain::entities::Entity;
use crate::error::RepositoryError;

/// Uniform CRUD, counting and paging over a collection of entities.
///
/// Every repository keeps an in-memory copy of the collection as last read
/// from (or written to) its store. `read_all` refreshes it, `sort_by_name`
/// reorders it, and `write_all` pushes it back to the store as a full rewrite.
///
/// Successful `read_all`, `write_all`, `add`, `replace` and `delete` calls
/// publish a [`RepositoryEvent`] to every receiver obtained from `subscribe`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileRepository`] - JSON and YAML files
/// - [`crate::infrastructure::persistence::PgRepository`] - PostgreSQL table
/// - [`super::FilteredRepository`] - filtering/sorting view over another repository
///
/// # Examples
///
/// See integration tests: `tests/repository_file.rs`, `tests/repository_pg.rs`
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Reloads the whole collection from the store.
    ///
    /// A file that does not exist yet is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Format`] if the file is not a sequence of mappings.
    /// Returns [`RepositoryError::Entity`] if a record fails validation.
    /// Returns [`RepositoryError::Database`] on database errors.
    async fn read_all(&self) -> Result<Vec<E>, RepositoryError>;

    /// Replaces the store's contents with the in-memory collection.
    async fn write_all(&self) -> Result<(), RepositoryError>;

    /// Finds an entity by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entity))` if found
    /// - `Ok(None)` if not found
    async fn get_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError>;

    /// Stores a new entity and writes the assigned id into it.
    ///
    /// Files assign `max(id) + 1` (1 for an empty file); the database assigns
    /// its identity value.
    async fn add(&self, entity: &mut E) -> Result<(), RepositoryError>;

    /// Replaces the entity stored under `id`, keeping that id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no entity has this id; the
    /// collection is left unchanged.
    async fn replace(&self, id: i64, entity: E) -> Result<(), RepositoryError>;

    /// Deletes the entity stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no entity has this id.
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Counts stored entities.
    async fn get_count(&self) -> Result<usize, RepositoryError>;

    /// Returns one page of short projections, ordered by id.
    ///
    /// # Arguments
    ///
    /// - `page_size` - items per page; must be positive
    /// - `page_number` - page number (1-indexed); must be positive
    ///
    /// # Returns
    ///
    /// `Ok(None)` for a non-positive size or number, an empty page past the end.
    async fn get_page(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<Option<Vec<E::Short>>, RepositoryError>;

    /// Stable-sorts the in-memory collection by name.
    async fn sort_by_name(&self, descending: bool) -> Result<(), RepositoryError>;

    /// Returns a copy of the in-memory collection.
    async fn snapshot(&self) -> Vec<E>;

    /// Registers for events published after this call.
    fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent<E>>;
}
