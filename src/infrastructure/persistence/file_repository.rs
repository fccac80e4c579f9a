//! JSON/YAML file repository.

use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use super::file_format::FileFormat;
use crate::domain::entities::Entity;
use crate::domain::pagination::paginate;
use crate::domain::repositories::{EventBus, Repository, RepositoryEvent};
use crate::error::{RepositoryError, ValidationError};

/// Repository over a single JSON or YAML file.
///
/// The whole file is the unit of durability: every mutation re-reads the file,
/// applies the change and rewrites the file completely. The in-memory
/// collection is guarded by a mutex held for the full load-mutate-save cycle,
/// which serializes writers within one process only.
pub struct FileRepository<E: Entity> {
    path: PathBuf,
    format: FileFormat,
    items: Mutex<Vec<E>>,
    events: EventBus<E>,
}

impl<E: Entity> FileRepository<E> {
    pub fn new(path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            path: path.into(),
            format,
            items: Mutex::new(Vec::new()),
            events: EventBus::new(),
        }
    }

    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn yaml(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileFormat::Yaml)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Writes the in-memory collection to another file in this repository's format.
    ///
    /// The repository's own file is left untouched.
    pub async fn write_all_to(&self, path: impl AsRef<Path>) -> Result<(), RepositoryError> {
        let items = self.items.lock().await;
        self.save(path.as_ref(), &items).await
    }

    /// Reads and decodes the file. A missing file is an empty collection.
    async fn load(&self) -> Result<Vec<E>, RepositoryError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "File not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RepositoryError::io(&self.path, e)),
        };

        let items = self
            .format
            .parse(&self.path, &text)?
            .iter()
            .map(E::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            path = %self.path.display(),
            kind = E::KIND,
            count = items.len(),
            "Loaded collection"
        );
        Ok(items)
    }

    async fn save(&self, path: &Path, items: &[E]) -> Result<(), RepositoryError> {
        write_collection(path, self.format, items).await?;
        debug!(
            path = %path.display(),
            kind = E::KIND,
            count = items.len(),
            "Saved collection"
        );
        Ok(())
    }
}

/// Renders `items` and replaces the file at `path`, creating missing directories.
pub async fn write_collection<T: Serialize>(
    path: &Path,
    format: FileFormat,
    items: &[T],
) -> Result<(), RepositoryError> {
    let text = format.render(path, items)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RepositoryError::io(parent, e))?;
    }
    tokio::fs::write(path, text)
        .await
        .map_err(|e| RepositoryError::io(path, e))
}

/// `max(id) + 1`, or 1 for an empty collection.
fn next_id<E: Entity>(items: &[E]) -> Result<i64, ValidationError> {
    let max = items.iter().map(Entity::id).max().unwrap_or(0);
    max.checked_add(1)
        .ok_or_else(|| ValidationError::new(E::ID_FIELD, format!("no id left after {max}")))
}

fn position<E: Entity>(items: &[E], id: i64) -> Result<usize, RepositoryError> {
    items
        .iter()
        .position(|e| e.id() == id)
        .ok_or_else(|| RepositoryError::not_found(E::KIND, id))
}

#[async_trait]
impl<E: Entity> Repository<E> for FileRepository<E> {
    async fn read_all(&self) -> Result<Vec<E>, RepositoryError> {
        let mut items = self.items.lock().await;
        *items = self.load().await?;
        self.events.publish(RepositoryEvent::ReadAll(items.clone()));
        Ok(items.clone())
    }

    async fn write_all(&self) -> Result<(), RepositoryError> {
        let items = self.items.lock().await;
        self.save(&self.path, &items).await?;
        self.events.publish(RepositoryEvent::WroteAll { count: items.len() });
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError> {
        Ok(self.load().await?.into_iter().find(|e| e.id() == id))
    }

    async fn add(&self, entity: &mut E) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().await;
        let mut current = self.load().await?;

        let id = next_id(&current)?;
        let mut stored = entity.clone();
        stored.set_id(id)?;
        current.push(stored.clone());

        self.save(&self.path, &current).await?;
        *items = current;
        *entity = stored.clone();

        info!(kind = E::KIND, id, "Added");
        self.events.publish(RepositoryEvent::Added(stored));
        Ok(())
    }

    async fn replace(&self, id: i64, mut entity: E) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().await;
        let mut current = self.load().await?;

        let index = position(&current, id)?;
        entity.set_id(id)?;
        current[index] = entity.clone();

        self.save(&self.path, &current).await?;
        *items = current;

        info!(kind = E::KIND, id, "Replaced");
        self.events.publish(RepositoryEvent::Replaced(entity));
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().await;
        let mut current = self.load().await?;

        let index = position(&current, id)?;
        current.remove(index);

        self.save(&self.path, &current).await?;
        *items = current;

        info!(kind = E::KIND, id, "Deleted");
        self.events.publish(RepositoryEvent::Deleted { id });
        Ok(())
    }

    async fn get_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.load().await?.len())
    }

    async fn get_page(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<Option<Vec<E::Short>>, RepositoryError> {
        let items = self.load().await?;
        Ok(paginate(&items, page_size, page_number)
            .map(|page| page.iter().map(Entity::to_short).collect()))
    }

    async fn sort_by_name(&self, descending: bool) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().await;
        items.sort_by(|a, b| {
            let ord = a.name_key().cmp(&b.name_key());
            if descending { ord.reverse() } else { ord }
        });
        Ok(())
    }

    async fn snapshot(&self) -> Vec<E> {
        self.items.lock().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent<E>> {
        self.events.subscribe()
    }
}
