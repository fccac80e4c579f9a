//! Error types shared by the domain and infrastructure layers.
//!
//! Three levels, from narrowest to widest:
//!
//! - [`ValidationError`] - a single field failed its invariant
//! - [`EntityError`] - an entity could not be built from its input
//! - [`RepositoryError`] - a storage operation failed
//!
//! Lookups that find nothing return `Ok(None)` or an empty collection; only
//! mutations of a missing record produce [`RepositoryError::NotFound`].

use std::path::PathBuf;
use thiserror::Error;

/// A field value that violates its invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failure to construct an entity from a record or delimited string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record handed to a constructor is not a mapping.
    #[error("unsupported {entity} record type: expected a mapping, got {found}")]
    UnsupportedType {
        entity: &'static str,
        found: &'static str,
    },

    #[error("{entity} record is missing field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
}

/// Failure of a repository operation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The backing file exists but does not hold a sequence of mappings.
    #[error("{}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unknown storage `{0}`, expected one of: db, json, yaml")]
    UnknownStorage(String),

    #[error("storage `db` requires a database connection pool")]
    MissingPool,
}

impl From<ValidationError> for RepositoryError {
    fn from(e: ValidationError) -> Self {
        Self::Entity(EntityError::Validation(e))
    }
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for [`RepositoryError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`RepositoryError::Format`].
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let e = ValidationError::new("phone", "must not be empty");
        assert_eq!(e.to_string(), "phone: must not be empty");
    }

    #[test]
    fn test_validation_converts_into_repository_error() {
        let e: RepositoryError = ValidationError::new("name", "bad").into();
        assert!(matches!(
            e,
            RepositoryError::Entity(EntityError::Validation(_))
        ));
    }

    #[test]
    fn test_not_found_and_format_are_distinct() {
        let nf = RepositoryError::not_found("client", 7);
        let fmt = RepositoryError::format("clients.json", "expected a list");

        assert!(nf.is_not_found());
        assert!(!nf.is_format());
        assert!(fmt.is_format());
        assert!(!fmt.is_not_found());
        assert_eq!(nf.to_string(), "client with id 7 not found");
        assert_eq!(fmt.to_string(), "clients.json: expected a list");
    }
}
