use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::entities::{Client, Investment, Security};
use crate::domain::repositories::Repository;
use crate::infrastructure::database;
use crate::infrastructure::factory::{RepositoryFactory, StorageKind, TableNames};

/// Repositories for the configured backend plus the pool that backs them.
///
/// Built once at startup; call [`AppState::shutdown`] before exiting so the
/// pool is closed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageKind,
    pub clients: Arc<dyn Repository<Client>>,
    pub securities: Arc<dyn Repository<Security>>,
    pub investments: Arc<dyn Repository<Investment>>,
    pub pool: Option<Arc<PgPool>>,
}

impl AppState {
    /// Opens the configured backend.
    ///
    /// For `STORAGE=db` this connects the pool; file backends only resolve paths.
    pub async fn build(config: &Config) -> Result<Self> {
        let (factory, pool) = match config.storage {
            StorageKind::Db => {
                let pool = Arc::new(database::connect(config).await?);
                let tables = TableNames {
                    clients: config.clients_table.clone(),
                    securities: config.securities_table.clone(),
                    investments: config.investments_table.clone(),
                };
                (
                    RepositoryFactory::database(Arc::clone(&pool), tables),
                    Some(pool),
                )
            }
            kind => (RepositoryFactory::files(kind, &config.data_dir)?, None),
        };

        tracing::info!(storage = %config.storage, "Storage backend selected");
        Self::from_factory(&factory, pool)
    }

    /// Builds the three repositories from an existing factory.
    pub fn from_factory(factory: &RepositoryFactory, pool: Option<Arc<PgPool>>) -> Result<Self> {
        Ok(Self {
            storage: factory.kind(),
            clients: factory.clients()?,
            securities: factory.securities()?,
            investments: factory.investments()?,
            pool,
        })
    }

    /// Closes the database pool, if any.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            database::close(pool).await;
        }
    }
}
