//! Client entity: an investor identified by name, legal form and contacts.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::Entity;
use super::record::{Record, split_delimited};
use crate::domain::validation::{
    parse_id, valid_address, valid_id, valid_name, valid_phone, valid_type_of_property,
};
use crate::error::{EntityError, ValidationError};

const DELIMITED_FIELDS: [&str; 5] = ["client_id", "name", "type_of_property", "address", "phone"];

/// A client of the investment business.
///
/// Serializes with verbatim field names in declaration order, which is the
/// on-disk layout of `clients.json` / `clients.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    client_id: i64,
    name: String,
    type_of_property: String,
    address: String,
    phone: String,
}

impl Client {
    /// Creates a client, validating and normalizing every field.
    ///
    /// Pass `client_id = 0` for a client that has not been stored yet.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn from_fields(
        client_id: i64,
        name: &str,
        type_of_property: &str,
        address: &str,
        phone: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            client_id: valid_id("client_id", client_id)?,
            name: valid_name(name)?,
            type_of_property: valid_type_of_property(type_of_property)?,
            address: valid_address(address)?,
            phone: valid_phone(phone)?,
        })
    }

    /// Creates a client from a mapping with the same keys as the JSON layout.
    ///
    /// A missing or null `client_id` is treated as `0`.
    pub fn from_record(record: &Value) -> Result<Self, EntityError> {
        let record = Record::new(Self::KIND, record)?;
        Ok(Self::from_fields(
            record.integer_or("client_id", 0)?,
            &record.text("name")?,
            &record.text("type_of_property")?,
            &record.text("address")?,
            &record.text("phone")?,
        )?)
    }

    /// Creates a client from `id;name;type_of_property;address;phone`.
    pub fn from_delimited(line: &str) -> Result<Self, EntityError> {
        let parts = split_delimited(Self::KIND, line, &DELIMITED_FIELDS, DELIMITED_FIELDS.len())?;
        Ok(Self::from_fields(
            parse_id("client_id", parts[0])?,
            parts[1],
            parts[2],
            parts[3],
            parts[4],
        )?)
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_of_property(&self) -> &str {
        &self.type_of_property
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn set_client_id(&mut self, client_id: i64) -> Result<(), ValidationError> {
        self.client_id = valid_id("client_id", client_id)?;
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = valid_name(name)?;
        Ok(())
    }

    pub fn set_type_of_property(&mut self, type_of_property: &str) -> Result<(), ValidationError> {
        self.type_of_property = valid_type_of_property(type_of_property)?;
        Ok(())
    }

    pub fn set_address(&mut self, address: &str) -> Result<(), ValidationError> {
        self.address = valid_address(address)?;
        Ok(())
    }

    /// Sets the phone, storing its normalized `7XXXXXXXXXX` form.
    pub fn set_phone(&mut self, phone: &str) -> Result<(), ValidationError> {
        self.phone = valid_phone(phone)?;
        Ok(())
    }
}

impl Entity for Client {
    type Short = ClientShort;

    const KIND: &'static str = "client";
    const COLLECTION: &'static str = "clients";
    const ID_FIELD: &'static str = "client_id";

    fn id(&self) -> i64 {
        self.client_id
    }

    fn set_id(&mut self, id: i64) -> Result<(), ValidationError> {
        self.set_client_id(id)
    }

    fn name_key(&self) -> String {
        self.name.clone()
    }

    fn from_record(record: &Value) -> Result<Self, EntityError> {
        Client::from_record(record)
    }

    fn to_short(&self) -> ClientShort {
        ClientShort::from(self)
    }
}

impl FromStr for Client {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_delimited(s)
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {} - {}",
            self.client_id, self.name, self.type_of_property, self.address, self.phone
        )
    }
}

/// List view of a client: surname followed by initials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientShort {
    pub client_id: i64,
    pub short_name: String,
    pub type_of_property: String,
    pub phone: String,
}

impl ClientShort {
    /// Abbreviates `Surname Name Patronymic` to `Surname N.P.`.
    pub fn make_short_name(name: &str) -> String {
        let mut parts = name.split_whitespace();
        let Some(surname) = parts.next() else {
            return String::new();
        };

        let initials: String = parts
            .filter_map(|p| p.chars().next())
            .map(|c| format!("{c}."))
            .collect();

        if initials.is_empty() {
            surname.to_string()
        } else {
            format!("{surname} {initials}")
        }
    }
}

impl From<&Client> for ClientShort {
    fn from(client: &Client) -> Self {
        Self {
            client_id: client.client_id,
            short_name: Self::make_short_name(&client.name),
            type_of_property: client.type_of_property.clone(),
            phone: client.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Client {
        Client::from_fields(
            1,
            "Ivanov Ivan Ivanovich",
            "ООО",
            "Moscow, Tverskaya 1",
            "+79991234567",
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation_normalizes_phone() {
        let client = sample();

        assert_eq!(client.client_id(), 1);
        assert_eq!(client.name(), "Ivanov Ivan Ivanovich");
        assert_eq!(client.type_of_property(), "ООО");
        assert_eq!(client.address(), "Moscow, Tverskaya 1");
        assert_eq!(client.phone(), "79991234567");
    }

    #[test]
    fn test_client_creation_rejects_invalid_field() {
        let err = Client::from_fields(0, "ivanov", "ООО", "Moscow", "89991234567").unwrap_err();
        assert_eq!(err.field, "name");

        let err = Client::from_fields(-1, "Ivanov Ivan", "ООО", "Moscow", "89991234567").unwrap_err();
        assert_eq!(err.field, "client_id");
    }

    #[test]
    fn test_three_construction_paths_agree() {
        let from_fields = sample();

        let from_record = Client::from_record(&json!({
            "client_id": 1,
            "name": "Ivanov Ivan Ivanovich",
            "type_of_property": "ООО",
            "address": "Moscow, Tverskaya 1",
            "phone": "89991234567"
        }))
        .unwrap();

        let from_delimited: Client = "1;Ivanov Ivan Ivanovich;ООО;Moscow, Tverskaya 1;9991234567"
            .parse()
            .unwrap();

        assert_eq!(from_fields, from_record);
        assert_eq!(from_fields, from_delimited);
    }

    #[test]
    fn test_record_without_id_is_unsaved() {
        let client = Client::from_record(&json!({
            "name": "Petrov Petr",
            "type_of_property": "ИП",
            "address": "Kazan",
            "phone": "9991234567"
        }))
        .unwrap();
        assert_eq!(client.client_id(), 0);
    }

    #[test]
    fn test_record_of_wrong_type() {
        let err = Client::from_record(&json!("1;Ivanov Ivan;ООО;Moscow;9991234567")).unwrap_err();
        assert!(matches!(err, EntityError::UnsupportedType { .. }));
    }

    #[test]
    fn test_delimited_with_missing_field() {
        let err = Client::from_delimited("1;Ivanov Ivan;ООО").unwrap_err();
        assert!(matches!(
            err,
            EntityError::MissingField { field: "address", .. }
        ));
    }

    #[test]
    fn test_setters_revalidate() {
        let mut client = sample();

        assert!(client.set_phone("123").is_err());
        assert_eq!(client.phone(), "79991234567");

        client.set_phone("89990000000").unwrap();
        assert_eq!(client.phone(), "79990000000");

        assert!(client.set_type_of_property("Partnership").is_err());
        assert!(client.set_address("").is_err());
        assert!(client.set_client_id(-3).is_err());
        assert_eq!(client.client_id(), 1);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(ClientShort::from(&sample()).short_name, "Ivanov I.I.");
        assert_eq!(ClientShort::make_short_name("Petrov-Vodkin Kuzma"), "Petrov-Vodkin K.");
        assert_eq!(ClientShort::make_short_name("Sidorov A. B."), "Sidorov A.B.");
    }

    #[test]
    fn test_serialized_key_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"client_id":1,"name":"Ivanov Ivan Ivanovich","type_of_property":"ООО","address":"Moscow, Tverskaya 1","phone":"79991234567"}"#
        );
    }
}
