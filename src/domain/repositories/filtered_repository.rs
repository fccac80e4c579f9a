//! Filtering and sorting view over another repository.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::{Repository, RepositoryEvent};
use super::query::SortKey;
use crate::domain::entities::Entity;
use crate::domain::pagination::paginate;
use crate::error::RepositoryError;

/// Keeps entities for which it returns `true`.
pub type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Extracts the value an entity is sorted by.
pub type KeyFn<E> = Arc<dyn Fn(&E) -> SortKey + Send + Sync>;

/// Repository decorator that filters and sorts without touching the base.
///
/// Borrows the wrapped repository and exposes the same [`Repository`]
/// operations. Reads (`read_all`, `get_count`, `get_page`) fetch the full
/// collection from the base, then filter and sort a private copy, so paging
/// always runs over the whole filtered dataset. Everything else is forwarded
/// as is, and `subscribe` hands out the base's event channel.
///
/// # Examples
///
/// ```ignore
/// let view = FilteredRepository::new(repo.as_ref())
///     .with_filter(|c: &Client| c.type_of_property().contains("ООО"))
///     .with_sort_key(|c: &Client| SortKey::Text(c.name().to_lowercase()));
/// let first_page = view.get_page(10, 1).await?;
/// ```
pub struct FilteredRepository<'a, E: Entity, R: Repository<E> + ?Sized> {
    base: &'a R,
    filter: Option<Predicate<E>>,
    sort_key: Option<KeyFn<E>>,
    descending: bool,
}

impl<'a, E: Entity, R: Repository<E> + ?Sized> FilteredRepository<'a, E, R> {
    /// Wraps `base` with no filter and no sorting.
    pub fn new(base: &'a R) -> Self {
        Self {
            base,
            filter: None,
            sort_key: None,
            descending: false,
        }
    }

    /// Replaces the whole filter/sort configuration at once.
    pub fn configure(
        mut self,
        filter: Option<Predicate<E>>,
        sort_key: Option<KeyFn<E>>,
        descending: bool,
    ) -> Self {
        self.filter = filter;
        self.sort_key = sort_key;
        self.descending = descending;
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_sort_key(mut self, key: impl Fn(&E) -> SortKey + Send + Sync + 'static) -> Self {
        self.sort_key = Some(Arc::new(key));
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// True when neither a filter nor a sort key is configured.
    pub fn is_passthrough(&self) -> bool {
        self.filter.is_none() && self.sort_key.is_none()
    }

    /// Fetches the full collection from the base, then filters and sorts it.
    pub async fn get_list(&self) -> Result<Vec<E>, RepositoryError> {
        let items = self.base.read_all().await?;
        let total = items.len();
        let items = filter_and_sort(
            items,
            self.filter.as_ref(),
            self.sort_key.as_ref(),
            self.descending,
        );
        debug!(
            kind = E::KIND,
            total,
            kept = items.len(),
            "Filtered list"
        );
        Ok(items)
    }
}

/// Applies an optional predicate, then an optional stable sort.
///
/// Descending order reverses the comparison, so equal keys keep their
/// original relative order either way.
pub fn filter_and_sort<E>(
    mut items: Vec<E>,
    filter: Option<&Predicate<E>>,
    sort_key: Option<&KeyFn<E>>,
    descending: bool,
) -> Vec<E> {
    if let Some(filter) = filter {
        items.retain(|item| filter(item));
    }

    if let Some(key) = sort_key {
        let mut keyed: Vec<(SortKey, E)> = items.into_iter().map(|e| (key(&e), e)).collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ord: Ordering = a.compare(b);
            if descending { ord.reverse() } else { ord }
        });
        items = keyed.into_iter().map(|(_, e)| e).collect();
    }

    items
}

#[async_trait]
impl<'a, E, R> Repository<E> for FilteredRepository<'a, E, R>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    async fn read_all(&self) -> Result<Vec<E>, RepositoryError> {
        self.get_list().await
    }

    async fn write_all(&self) -> Result<(), RepositoryError> {
        self.base.write_all().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError> {
        self.base.get_by_id(id).await
    }

    async fn add(&self, entity: &mut E) -> Result<(), RepositoryError> {
        self.base.add(entity).await
    }

    async fn replace(&self, id: i64, entity: E) -> Result<(), RepositoryError> {
        self.base.replace(id, entity).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.base.delete(id).await
    }

    async fn get_count(&self) -> Result<usize, RepositoryError> {
        if self.is_passthrough() {
            return self.base.get_count().await;
        }
        Ok(self.get_list().await?.len())
    }

    async fn get_page(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<Option<Vec<E::Short>>, RepositoryError> {
        let items = self.get_list().await?;
        Ok(paginate(&items, page_size, page_number)
            .map(|page| page.iter().map(Entity::to_short).collect()))
    }

    async fn sort_by_name(&self, descending: bool) -> Result<(), RepositoryError> {
        self.base.sort_by_name(descending).await
    }

    async fn snapshot(&self) -> Vec<E> {
        self.base.snapshot().await
    }

    fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent<E>> {
        self.base.subscribe()
    }
}
