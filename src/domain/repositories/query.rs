//! List queries: per-entity filter fields and sort keys.
//!
//! A query is built from raw user input (blank means "not set") and turned
//! into a [`FilteredRepository`] with [`ListQuery::apply`].

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::sync::Arc;

use super::Repository;
use super::filtered_repository::{FilteredRepository, KeyFn, Predicate};
use crate::domain::entities::{Client, Entity, Investment, Security};

/// A value entities are ordered by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl SortKey {
    /// Total order; floats use IEEE total ordering, mixed variants order by variant.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Float(_) => 1,
            Self::Text(_) => 2,
            Self::Date(_) => 3,
        }
    }
}

/// Filter and sort settings for one entity type.
pub trait ListQuery<E: Entity> {
    /// Predicate for the set filter fields, `None` when no field is set.
    fn predicate(&self) -> Option<Predicate<E>>;

    /// Key for the requested sort field, `None` for blank or unknown fields.
    fn sort_key(&self) -> Option<KeyFn<E>>;

    /// Raw order token.
    fn order(&self) -> &str;

    /// Only `"desc"` (any case, surrounding blanks ignored) sorts descending.
    fn is_descending(&self) -> bool {
        self.order().trim().eq_ignore_ascii_case("desc")
    }

    /// Wraps `base` in a decorator configured from this query.
    fn apply<'a, R: Repository<E> + ?Sized>(&self, base: &'a R) -> FilteredRepository<'a, E, R> {
        FilteredRepository::new(base).configure(
            self.predicate(),
            self.sort_key(),
            self.is_descending(),
        )
    }
}

fn normalized(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Client list query.
///
/// - `type_of_property` - case-sensitive substring
/// - `name`, `phone` - case-insensitive substring
/// - `sort_by` - `id`, `name`, `type`, `phone`
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub type_of_property: String,
    pub name: String,
    pub phone: String,
    pub sort_by: String,
    pub order: String,
}

impl ListQuery<Client> for ClientQuery {
    fn predicate(&self) -> Option<Predicate<Client>> {
        let kind = self.type_of_property.trim().to_string();
        let name = normalized(&self.name);
        let phone = normalized(&self.phone);

        if kind.is_empty() && name.is_empty() && phone.is_empty() {
            return None;
        }

        Some(Arc::new(move |c: &Client| {
            (kind.is_empty() || c.type_of_property().contains(&kind))
                && (name.is_empty() || c.name().to_lowercase().contains(&name))
                && (phone.is_empty() || c.phone().to_lowercase().contains(&phone))
        }))
    }

    fn sort_key(&self) -> Option<KeyFn<Client>> {
        let key: KeyFn<Client> = match normalized(&self.sort_by).as_str() {
            "id" | "client_id" => Arc::new(|c: &Client| SortKey::Int(c.client_id())),
            "name" => Arc::new(|c: &Client| SortKey::Text(c.name().to_lowercase())),
            "type" | "type_of_property" => {
                Arc::new(|c: &Client| SortKey::Text(c.type_of_property().to_string()))
            }
            "phone" => Arc::new(|c: &Client| SortKey::Text(c.phone().to_string())),
            _ => return None,
        };
        Some(key)
    }

    fn order(&self) -> &str {
        &self.order
    }
}

/// Security list query.
///
/// - `name`, `security_type` - case-insensitive substring
/// - `income_min`, `income_max` - inclusive bounds; unparseable bounds are ignored
/// - `sort_by` - `id`, `name`, `type`, `income`
#[derive(Debug, Clone, Default)]
pub struct SecurityQuery {
    pub name: String,
    pub security_type: String,
    pub income_min: String,
    pub income_max: String,
    pub sort_by: String,
    pub order: String,
}

impl ListQuery<Security> for SecurityQuery {
    fn predicate(&self) -> Option<Predicate<Security>> {
        let name = normalized(&self.name);
        let kind = normalized(&self.security_type);
        let min = self.income_min.trim().parse::<f64>().ok();
        let max = self.income_max.trim().parse::<f64>().ok();

        if name.is_empty() && kind.is_empty() && min.is_none() && max.is_none() {
            return None;
        }

        Some(Arc::new(move |s: &Security| {
            (name.is_empty() || s.name().to_lowercase().contains(&name))
                && (kind.is_empty() || s.security_type().to_lowercase().contains(&kind))
                && min.is_none_or(|m| s.income() >= m)
                && max.is_none_or(|m| s.income() <= m)
        }))
    }

    fn sort_key(&self) -> Option<KeyFn<Security>> {
        let key: KeyFn<Security> = match normalized(&self.sort_by).as_str() {
            "id" | "security_id" => Arc::new(|s: &Security| SortKey::Int(s.security_id())),
            "name" => Arc::new(|s: &Security| SortKey::Text(s.name().to_lowercase())),
            "type" | "security_type" => {
                Arc::new(|s: &Security| SortKey::Text(s.security_type().to_lowercase()))
            }
            "income" => Arc::new(|s: &Security| SortKey::Float(s.income())),
            _ => return None,
        };
        Some(key)
    }

    fn order(&self) -> &str {
        &self.order
    }
}

/// Investment list query.
///
/// - `client_id`, `security_id` - exact match
/// - `sort_by` - `id`, `amount`, `start_date`
#[derive(Debug, Clone, Default)]
pub struct InvestmentQuery {
    pub client_id: Option<i64>,
    pub security_id: Option<i64>,
    pub sort_by: String,
    pub order: String,
}

impl ListQuery<Investment> for InvestmentQuery {
    fn predicate(&self) -> Option<Predicate<Investment>> {
        let (client_id, security_id) = (self.client_id, self.security_id);
        if client_id.is_none() && security_id.is_none() {
            return None;
        }

        Some(Arc::new(move |i: &Investment| {
            client_id.is_none_or(|id| i.client_id() == id)
                && security_id.is_none_or(|id| i.security_id() == id)
        }))
    }

    fn sort_key(&self) -> Option<KeyFn<Investment>> {
        let key: KeyFn<Investment> = match normalized(&self.sort_by).as_str() {
            "id" | "investment_id" => Arc::new(|i: &Investment| SortKey::Int(i.investment_id())),
            "amount" => Arc::new(|i: &Investment| SortKey::Float(i.amount())),
            "start_date" | "date" => Arc::new(|i: &Investment| SortKey::Date(i.start_date())),
            _ => return None,
        };
        Some(key)
    }

    fn order(&self) -> &str {
        &self.order
    }
}
