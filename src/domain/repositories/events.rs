//! Change notifications published by repositories.
//!
//! Every repository owns an [`EventBus`]. Callers that want to react to
//! loads and mutations call [`super::Repository::subscribe`] and receive
//! [`RepositoryEvent`]s on a `tokio::sync::broadcast` channel. Publishing
//! with no subscribers is a no-op.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::entities::Entity;

/// Buffered events per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 64;

/// A completed repository operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryEvent<E> {
    /// The collection was reloaded from the store.
    ReadAll(Vec<E>),
    /// The in-memory collection replaced the store's contents.
    WroteAll { count: usize },
    /// A new entity was stored, with its assigned id.
    Added(E),
    /// The entity stored under its id was replaced.
    Replaced(E),
    Deleted { id: i64 },
}

impl<E> RepositoryEvent<E> {
    /// Short name of the operation (`"read_all"`, `"add"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReadAll(_) => "read_all",
            Self::WroteAll { .. } => "write_all",
            Self::Added(_) => "add",
            Self::Replaced(_) => "replace",
            Self::Deleted { .. } => "delete",
        }
    }
}

/// Sending half of a repository's event channel.
#[derive(Debug, Clone)]
pub struct EventBus<E: Entity> {
    sender: broadcast::Sender<RepositoryEvent<E>>,
}

impl<E: Entity> EventBus<E> {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent<E>> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: RepositoryEvent<E>) {
        let kind = event.kind();
        if self.sender.send(event).is_err() {
            trace!(entity = E::KIND, event = kind, "No subscribers");
        }
    }
}

impl<E: Entity> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
