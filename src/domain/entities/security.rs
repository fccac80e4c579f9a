//! Security entity: a financial instrument with an expected income.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::Entity;
use super::record::{Record, split_delimited};
use crate::domain::validation::{
    parse_id, parse_income, valid_id, valid_income, valid_security_name, valid_security_type,
};
use crate::error::{EntityError, ValidationError};

const DELIMITED_FIELDS: [&str; 4] = ["security_id", "name", "security_type", "income"];

/// Maximum length of [`SecurityShort::short_name`] before truncation.
pub const SHORT_NAME_LEN: usize = 18;

/// A security that clients can invest in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Security {
    security_id: i64,
    name: String,
    security_type: String,
    income: f64,
}

impl Security {
    /// Creates a security, validating every field.
    pub fn from_fields(
        security_id: i64,
        name: &str,
        security_type: &str,
        income: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            security_id: valid_id("security_id", security_id)?,
            name: valid_security_name(name)?,
            security_type: valid_security_type(security_type)?,
            income: valid_income(income)?,
        })
    }

    /// Creates a security from a mapping; `income` may be a number or numeric text.
    pub fn from_record(record: &Value) -> Result<Self, EntityError> {
        let record = Record::new(Self::KIND, record)?;
        Ok(Self::from_fields(
            record.integer_or("security_id", 0)?,
            &record.text("name")?,
            &record.text("security_type")?,
            parse_income(&record.text("income")?)?,
        )?)
    }

    /// Creates a security from `id;name;security_type;income`.
    pub fn from_delimited(line: &str) -> Result<Self, EntityError> {
        let parts = split_delimited(Self::KIND, line, &DELIMITED_FIELDS, DELIMITED_FIELDS.len())?;
        Ok(Self::from_fields(
            parse_id("security_id", parts[0])?,
            parts[1],
            parts[2],
            parse_income(parts[3])?,
        )?)
    }

    pub fn security_id(&self) -> i64 {
        self.security_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn security_type(&self) -> &str {
        &self.security_type
    }

    pub fn income(&self) -> f64 {
        self.income
    }

    pub fn set_security_id(&mut self, security_id: i64) -> Result<(), ValidationError> {
        self.security_id = valid_id("security_id", security_id)?;
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = valid_security_name(name)?;
        Ok(())
    }

    pub fn set_security_type(&mut self, security_type: &str) -> Result<(), ValidationError> {
        self.security_type = valid_security_type(security_type)?;
        Ok(())
    }

    pub fn set_income(&mut self, income: f64) -> Result<(), ValidationError> {
        self.income = valid_income(income)?;
        Ok(())
    }
}

impl Entity for Security {
    type Short = SecurityShort;

    const KIND: &'static str = "security";
    const COLLECTION: &'static str = "securities";
    const ID_FIELD: &'static str = "security_id";

    fn id(&self) -> i64 {
        self.security_id
    }

    fn set_id(&mut self, id: i64) -> Result<(), ValidationError> {
        self.set_security_id(id)
    }

    fn name_key(&self) -> String {
        self.name.clone()
    }

    fn from_record(record: &Value) -> Result<Self, EntityError> {
        Security::from_record(record)
    }

    fn to_short(&self) -> SecurityShort {
        SecurityShort::from(self)
    }
}

impl FromStr for Security {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_delimited(s)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.security_id, self.name, self.security_type, self.income
        )
    }
}

/// List view of a security with the name cut to [`SHORT_NAME_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityShort {
    pub security_id: i64,
    pub short_name: String,
    pub security_type: String,
    pub income: f64,
}

impl SecurityShort {
    pub fn make_short_name(name: &str) -> String {
        let name = name.trim();
        if name.chars().count() <= SHORT_NAME_LEN {
            return name.to_string();
        }
        let mut short: String = name.chars().take(SHORT_NAME_LEN).collect();
        short.push('…');
        short
    }
}

impl From<&Security> for SecurityShort {
    fn from(security: &Security) -> Self {
        Self {
            security_id: security.security_id,
            short_name: Self::make_short_name(&security.name),
            security_type: security.security_type.clone(),
            income: security.income,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_security_creation() {
        let sec = Security::from_fields(3, " Gazprom bond ", "bond", 8.25).unwrap();

        assert_eq!(sec.security_id(), 3);
        assert_eq!(sec.name(), "Gazprom bond");
        assert_eq!(sec.security_type(), "bond");
        assert_eq!(sec.income(), 8.25);
    }

    #[test]
    fn test_security_rejects_blank_fields() {
        assert_eq!(
            Security::from_fields(0, " ", "bond", 1.0).unwrap_err().field,
            "name"
        );
        assert_eq!(
            Security::from_fields(0, "X", "", 1.0).unwrap_err().field,
            "security_type"
        );
        assert_eq!(
            Security::from_fields(0, "X", "bond", f64::NAN).unwrap_err().field,
            "income"
        );
    }

    #[test]
    fn test_income_coerced_from_text() {
        let from_record = Security::from_record(&json!({
            "security_id": "2",
            "name": "OFZ 26238",
            "security_type": "bond",
            "income": "7.1"
        }))
        .unwrap();
        let from_delimited = Security::from_delimited("2;OFZ 26238;bond;7.1").unwrap();

        assert_eq!(from_record, from_delimited);
        assert_eq!(from_record.income(), 7.1);
    }

    #[test]
    fn test_income_not_numeric() {
        let err = Security::from_delimited("2;OFZ;bond;high").unwrap_err();
        assert!(matches!(
            err,
            EntityError::Validation(ValidationError { field: "income", .. })
        ));
    }

    #[test]
    fn test_short_name_truncation() {
        assert_eq!(SecurityShort::make_short_name("Sberbank"), "Sberbank");
        assert_eq!(
            SecurityShort::make_short_name("Exactly eighteen!!"),
            "Exactly eighteen!!"
        );
        assert_eq!(
            SecurityShort::make_short_name("Сбербанк привилегированные акции"),
            "Сбербанк привилеги…"
        );
    }

    #[test]
    fn test_setters_revalidate() {
        let mut sec = Security::from_fields(1, "Bond", "bond", 1.0).unwrap();
        assert!(sec.set_name("").is_err());
        assert!(sec.set_income(f64::INFINITY).is_err());
        sec.set_income(2.5).unwrap();
        assert_eq!(sec.income(), 2.5);
        assert_eq!(sec.name(), "Bond");
    }
}
