//! PostgreSQL implementation of the repository contract.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use super::pg_entity::PgEntity;
use crate::domain::entities::Entity;
use crate::domain::pagination::offset_limit;
use crate::domain::repositories::{EventBus, Repository, RepositoryEvent};
use crate::error::RepositoryError;

/// PostgreSQL repository for one entity table.
///
/// Every CRUD operation is a single parameterized statement. The table name
/// is interpolated into SQL and must come from trusted configuration.
/// `write_all` replaces the table contents inside one transaction and moves
/// the identity sequence past the highest id.
pub struct PgRepository<E: PgEntity> {
    pool: Arc<PgPool>,
    table: String,
    items: Mutex<Vec<E>>,
    events: EventBus<E>,
}

impl<E: PgEntity> PgRepository<E> {
    /// Creates a repository over the entity's default table (`clients`, ...).
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_table(pool, E::COLLECTION)
    }

    pub fn with_table(pool: Arc<PgPool>, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
            items: Mutex::new(Vec::new()),
            events: EventBus::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT {}, {} FROM {}",
            E::ID_FIELD,
            E::COLUMNS.join(", "),
            self.table
        )
    }

    /// `$first, $first+1, ...` for `count` parameters.
    fn placeholders(first: usize, count: usize) -> String {
        (first..first + count)
            .map(|n| format!("${n}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E> for PgRepository<E> {
    async fn read_all(&self) -> Result<Vec<E>, RepositoryError> {
        let sql = format!("{} ORDER BY {}", self.select_sql(), E::ID_FIELD);
        let rows = sqlx::query(&sql).fetch_all(self.pool.as_ref()).await?;
        let loaded = rows.iter().map(E::from_row).collect::<Result<Vec<_>, _>>()?;

        debug!(table = %self.table, count = loaded.len(), "Loaded table");

        let mut items = self.items.lock().await;
        *items = loaded;
        self.events.publish(RepositoryEvent::ReadAll(items.clone()));
        Ok(items.clone())
    }

    async fn write_all(&self) -> Result<(), RepositoryError> {
        let items = self.items.lock().await;
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, {})",
            self.table,
            E::ID_FIELD,
            E::COLUMNS.join(", "),
            Self::placeholders(2, E::COLUMNS.len())
        );
        for item in items.iter() {
            item.bind_columns(sqlx::query(&insert).bind(item.id()))
                .execute(&mut *tx)
                .await?;
        }

        let resync = format!(
            "SELECT setval(pg_get_serial_sequence($1, $2), COALESCE((SELECT MAX({id}) FROM {table}), 0) + 1, false)",
            id = E::ID_FIELD,
            table = self.table
        );
        sqlx::query(&resync)
            .bind(&self.table)
            .bind(E::ID_FIELD)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(table = %self.table, count = items.len(), "Rewrote table");
        self.events.publish(RepositoryEvent::WroteAll { count: items.len() });
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<E>, RepositoryError> {
        if id <= 0 {
            return Ok(None);
        }

        let sql = format!("{} WHERE {} = $1", self.select_sql(), E::ID_FIELD);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.as_ref().map(E::from_row).transpose()
    }

    async fn add(&self, entity: &mut E) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.table,
            E::COLUMNS.join(", "),
            Self::placeholders(1, E::COLUMNS.len()),
            E::ID_FIELD
        );
        let row = entity
            .bind_columns(sqlx::query(&sql))
            .fetch_one(self.pool.as_ref())
            .await?;
        let id: i64 = row.try_get(0)?;

        entity.set_id(id)?;

        info!(table = %self.table, id, "Inserted");
        self.events.publish(RepositoryEvent::Added(entity.clone()));
        Ok(())
    }

    async fn replace(&self, id: i64, mut entity: E) -> Result<(), RepositoryError> {
        entity.set_id(id)?;

        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            self.table,
            assignments,
            E::ID_FIELD,
            E::COLUMNS.len() + 1
        );

        let result = entity
            .bind_columns(sqlx::query(&sql))
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::KIND, id));
        }

        info!(table = %self.table, id, "Updated");
        self.events.publish(RepositoryEvent::Replaced(entity));
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", self.table, E::ID_FIELD);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::KIND, id));
        }

        info!(table = %self.table, id, "Deleted");
        self.events.publish(RepositoryEvent::Deleted { id });
        Ok(())
    }

    async fn get_count(&self) -> Result<usize, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn get_page(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<Option<Vec<E::Short>>, RepositoryError> {
        let Some((offset, limit)) = offset_limit(page_size, page_number) else {
            return Ok(None);
        };

        let sql = format!(
            "{} ORDER BY {} LIMIT $1 OFFSET $2",
            self.select_sql(),
            E::ID_FIELD
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        let page = rows
            .iter()
            .map(|row| E::from_row(row).map(|e| e.to_short()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(page))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Client, Investment};

    #[test]
    fn test_placeholders() {
        assert_eq!(PgRepository::<Client>::placeholders(1, 3), "$1, $2, $3");
        assert_eq!(PgRepository::<Client>::placeholders(2, 1), "$2");
    }

    #[tokio::test]
    async fn test_select_uses_configured_table() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let repo = PgRepository::<Investment>::with_table(Arc::new(pool), "archive_investments");

        assert_eq!(
            repo.select_sql(),
            "SELECT investment_id, client_id, security_id, amount, start_date, end_date, result FROM archive_investments"
        );
    }
}
