//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Client`] - an investor, person or organization
//! - [`Security`] - a financial instrument clients invest in
//! - [`Investment`] - a client's position in a security
//!
//! Each entity has a read-only short projection used by list pages
//! ([`ClientShort`], [`SecurityShort`], [`InvestmentShort`]).
//!
//! # Construction
//!
//! Entities can be built three ways, all funnelling into the validating
//! `from_fields` constructor:
//!
//! - `from_fields` - explicit, typed arguments
//! - `from_record` - a mapping loaded from JSON, YAML or a database row
//! - `from_delimited` - a `;`-separated positional string
//!
//! Fields are private; setters re-run validation so an entity never holds an
//! invalid value.

pub mod client;
pub mod investment;
pub mod record;
pub mod security;

pub use client::{Client, ClientShort};
pub use investment::{Investment, InvestmentShort};
pub use security::{Security, SecurityShort};

use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::{EntityError, ValidationError};

/// Behaviour shared by every stored entity.
///
/// Repositories are generic over this trait; it carries identity handling,
/// record decoding and the short projection.
pub trait Entity: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static {
    /// List-display projection of the entity.
    type Short: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Singular name used in error messages and logs (`"client"`).
    const KIND: &'static str;

    /// Plural name used for file stems and default table names (`"clients"`).
    const COLLECTION: &'static str;

    /// Name of the identity field in records (`"client_id"`).
    const ID_FIELD: &'static str;

    fn id(&self) -> i64;

    /// Assigns the identity, validating it like any other field.
    fn set_id(&mut self, id: i64) -> Result<(), ValidationError>;

    /// Key used by `sort_by_name`.
    fn name_key(&self) -> String;

    /// Builds the entity from a mapping record.
    fn from_record(record: &Value) -> Result<Self, EntityError>;

    fn to_short(&self) -> Self::Short;
}
