//! Storage selection: builds one repository per entity for the configured backend.

use sqlx::PgPool;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::entities::{Client, Entity, Investment, Security};
use crate::domain::repositories::Repository;
use crate::error::RepositoryError;
use crate::infrastructure::persistence::{FileFormat, FileRepository, PgEntity, PgRepository};

/// Storage backend, selected by the strings `db`, `json` and `yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Db,
    Json,
    Yaml,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Db => "db",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// File format for file backends, `None` for the database.
    pub fn file_format(self) -> Option<FileFormat> {
        match self {
            Self::Db => None,
            Self::Json => Some(FileFormat::Json),
            Self::Yaml => Some(FileFormat::Yaml),
        }
    }
}

impl FromStr for StorageKind {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "db" => Ok(Self::Db),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(RepositoryError::UnknownStorage(s.to_string())),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table names used by the database backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub clients: String,
    pub securities: String,
    pub investments: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            clients: Client::COLLECTION.to_string(),
            securities: Security::COLLECTION.to_string(),
            investments: Investment::COLLECTION.to_string(),
        }
    }
}

/// Builds repositories for one backend.
///
/// File backends store each entity in `data_dir/<collection>.<ext>`; the
/// database backend shares one pool between all three tables.
#[derive(Clone)]
pub struct RepositoryFactory {
    kind: StorageKind,
    data_dir: PathBuf,
    pool: Option<Arc<PgPool>>,
    tables: TableNames,
}

impl RepositoryFactory {
    /// Factory for the JSON or YAML backend.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingPool`] for [`StorageKind::Db`].
    pub fn files(kind: StorageKind, data_dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        if kind == StorageKind::Db {
            return Err(RepositoryError::MissingPool);
        }
        Ok(Self {
            kind,
            data_dir: data_dir.into(),
            pool: None,
            tables: TableNames::default(),
        })
    }

    /// Factory for the database backend.
    pub fn database(pool: Arc<PgPool>, tables: TableNames) -> Self {
        Self {
            kind: StorageKind::Db,
            data_dir: PathBuf::new(),
            pool: Some(pool),
            tables,
        }
    }

    /// Factory selected by a storage name (`"db" | "json" | "yaml"`).
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::UnknownStorage`] for any other name
    /// - [`RepositoryError::MissingPool`] for `db` without a pool
    pub fn from_name(
        name: &str,
        data_dir: impl Into<PathBuf>,
        pool: Option<Arc<PgPool>>,
    ) -> Result<Self, RepositoryError> {
        match name.parse::<StorageKind>()? {
            StorageKind::Db => {
                let pool = pool.ok_or(RepositoryError::MissingPool)?;
                Ok(Self::database(pool, TableNames::default()))
            }
            kind => Self::files(kind, data_dir),
        }
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File path used for `E` by file backends.
    pub fn file_path<E: Entity>(&self) -> PathBuf {
        let ext = self
            .kind
            .file_format()
            .map_or("json", FileFormat::extension);
        self.data_dir.join(format!("{}.{ext}", E::COLLECTION))
    }

    fn build<E: PgEntity>(&self, table: &str) -> Result<Arc<dyn Repository<E>>, RepositoryError> {
        match (self.kind.file_format(), &self.pool) {
            (Some(format), _) => Ok(Arc::new(FileRepository::<E>::new(
                self.file_path::<E>(),
                format,
            ))),
            (None, Some(pool)) => Ok(Arc::new(PgRepository::<E>::with_table(
                Arc::clone(pool),
                table,
            ))),
            (None, None) => Err(RepositoryError::MissingPool),
        }
    }

    pub fn clients(&self) -> Result<Arc<dyn Repository<Client>>, RepositoryError> {
        self.build(&self.tables.clients)
    }

    pub fn securities(&self) -> Result<Arc<dyn Repository<Security>>, RepositoryError> {
        self.build(&self.tables.securities)
    }

    pub fn investments(&self) -> Result<Arc<dyn Repository<Investment>>, RepositoryError> {
        self.build(&self.tables.investments)
    }
}
