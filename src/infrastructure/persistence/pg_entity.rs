//! Row mapping between entities and their PostgreSQL tables.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use crate::domain::entities::{Client, Entity, Investment, Security};
use crate::error::RepositoryError;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// An entity that can be stored in a PostgreSQL table.
///
/// The identity column is named after [`Entity::ID_FIELD`]; `COLUMNS` lists
/// the remaining columns in the order `bind_columns` binds them.
pub trait PgEntity: Entity {
    const COLUMNS: &'static [&'static str];

    /// Decodes a row selected as `id, COLUMNS...`.
    ///
    /// Values go through the validating constructor, so a row that violates an
    /// invariant is reported rather than loaded.
    fn from_row(row: &PgRow) -> Result<Self, RepositoryError>;

    /// Binds every non-id column, in `COLUMNS` order.
    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;
}

impl PgEntity for Client {
    const COLUMNS: &'static [&'static str] = &["name", "type_of_property", "address", "phone"];

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let name: String = row.try_get("name")?;
        let type_of_property: String = row.try_get("type_of_property")?;
        let address: String = row.try_get("address")?;
        let phone: String = row.try_get("phone")?;

        Ok(Client::from_fields(
            row.try_get("client_id")?,
            &name,
            &type_of_property,
            &address,
            &phone,
        )?)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.name().to_string())
            .bind(self.type_of_property().to_string())
            .bind(self.address().to_string())
            .bind(self.phone().to_string())
    }
}

impl PgEntity for Security {
    const COLUMNS: &'static [&'static str] = &["name", "security_type", "income"];

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let name: String = row.try_get("name")?;
        let security_type: String = row.try_get("security_type")?;

        Ok(Security::from_fields(
            row.try_get("security_id")?,
            &name,
            &security_type,
            row.try_get("income")?,
        )?)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.name().to_string())
            .bind(self.security_type().to_string())
            .bind(self.income())
    }
}

impl PgEntity for Investment {
    const COLUMNS: &'static [&'static str] = &[
        "client_id",
        "security_id",
        "amount",
        "start_date",
        "end_date",
        "result",
    ];

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        Ok(Investment::from_fields(
            row.try_get("investment_id")?,
            row.try_get("client_id")?,
            row.try_get("security_id")?,
            row.try_get("amount")?,
            row.try_get("start_date")?,
            row.try_get("end_date")?,
            row.try_get("result")?,
        )?)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.client_id())
            .bind(self.security_id())
            .bind(self.amount())
            .bind(self.start_date())
            .bind(self.end_date())
            .bind(self.result())
    }
}
