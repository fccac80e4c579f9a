//! Raw user input for creating and editing entities.
//!
//! A form holds every field as text, exactly as typed. The `Validate` derive
//! checks each field on its own and reports every failure at once as
//! [`ValidationErrors`]; `build` then turns a clean form into the entity with
//! normalized values.

use std::borrow::Cow;
use validator::{Validate, ValidationErrors};

use crate::domain::entities::{Client, Investment, Security};
use crate::domain::validation::{
    DATE_FORMAT, parse_amount, parse_id, parse_income, valid_address, valid_date, valid_name,
    valid_phone, valid_required_date, valid_result, valid_security_name, valid_security_type,
    valid_type_of_property,
};
use crate::error::ValidationError;

/// Converts a field failure into the `validator` representation.
fn field_error(error: ValidationError) -> validator::ValidationError {
    let mut converted = validator::ValidationError::new("invalid");
    converted.message = Some(Cow::Owned(error.message));
    converted
}

/// A single failure reported under the field it names.
fn rejected(error: ValidationError) -> ValidationErrors {
    let field = error.field;
    let mut errors = ValidationErrors::new();
    errors.add(field, field_error(error));
    errors
}

fn check<T>(result: Result<T, ValidationError>) -> Result<(), validator::ValidationError> {
    result.map(drop).map_err(field_error)
}

fn check_name(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_name(raw))
}

fn check_type_of_property(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_type_of_property(raw))
}

fn check_address(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_address(raw))
}

fn check_phone(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_phone(raw.trim()))
}

fn check_security_name(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_security_name(raw))
}

fn check_security_type(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_security_type(raw))
}

fn check_income(raw: &str) -> Result<(), validator::ValidationError> {
    check(parse_income(raw))
}

fn check_client_id(raw: &str) -> Result<(), validator::ValidationError> {
    check(parse_id("client_id", raw))
}

fn check_security_id(raw: &str) -> Result<(), validator::ValidationError> {
    check(parse_id("security_id", raw))
}

fn check_amount(raw: &str) -> Result<(), validator::ValidationError> {
    check(parse_amount(raw))
}

fn check_start_date(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_required_date("start_date", raw))
}

fn check_end_date(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_date("end_date", raw, false))
}

fn check_result(raw: &str) -> Result<(), validator::ValidationError> {
    check(valid_result(raw))
}

/// Runs the derived field checks, yielding an empty set when all pass.
fn field_errors<T: Validate>(form: &T) -> ValidationErrors {
    form.validate().err().unwrap_or_else(ValidationErrors::new)
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Client fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ClientForm {
    #[validate(custom(function = "check_name"))]
    pub name: String,
    #[validate(custom(function = "check_type_of_property"))]
    pub type_of_property: String,
    #[validate(custom(function = "check_address"))]
    pub address: String,
    #[validate(custom(function = "check_phone"))]
    pub phone: String,
}

impl ClientForm {
    /// Builds a client with id `0` (new) or the id being edited.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn build(&self, client_id: i64) -> Result<Client, ValidationErrors> {
        self.validate()?;
        Client::from_fields(
            client_id,
            &valid_name(&self.name).map_err(rejected)?,
            &valid_type_of_property(&self.type_of_property).map_err(rejected)?,
            &valid_address(&self.address).map_err(rejected)?,
            &valid_phone(self.phone.trim()).map_err(rejected)?,
        )
        .map_err(rejected)
    }
}

impl From<&Client> for ClientForm {
    fn from(c: &Client) -> Self {
        Self {
            name: c.name().to_string(),
            type_of_property: c.type_of_property().to_string(),
            address: c.address().to_string(),
            phone: c.phone().to_string(),
        }
    }
}

/// Security fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct SecurityForm {
    #[validate(custom(function = "check_security_name"))]
    pub name: String,
    #[validate(custom(function = "check_security_type"))]
    pub security_type: String,
    #[validate(custom(function = "check_income"))]
    pub income: String,
}

impl SecurityForm {
    pub fn build(&self, security_id: i64) -> Result<Security, ValidationErrors> {
        self.validate()?;
        Security::from_fields(
            security_id,
            &valid_security_name(&self.name).map_err(rejected)?,
            &valid_security_type(&self.security_type).map_err(rejected)?,
            parse_income(&self.income).map_err(rejected)?,
        )
        .map_err(rejected)
    }
}

impl From<&Security> for SecurityForm {
    fn from(s: &Security) -> Self {
        Self {
            name: s.name().to_string(),
            security_type: s.security_type().to_string(),
            income: s.income().to_string(),
        }
    }
}

/// Investment fields as typed by the user.
///
/// `end_date` and `result` may be left blank for an open position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct InvestmentForm {
    #[validate(custom(function = "check_client_id"))]
    pub client_id: String,
    #[validate(custom(function = "check_security_id"))]
    pub security_id: String,
    #[validate(custom(function = "check_amount"))]
    pub amount: String,
    #[validate(custom(function = "check_start_date"))]
    pub start_date: String,
    #[validate(custom(function = "check_end_date"))]
    pub end_date: String,
    #[validate(custom(function = "check_result"))]
    pub result: String,
}

impl InvestmentForm {
    /// Builds an investment; an end date before the start date is reported
    /// under `end_date` along with any other field errors.
    pub fn build(&self, investment_id: i64) -> Result<Investment, ValidationErrors> {
        let mut errors = field_errors(self);

        let start_date = valid_required_date("start_date", &self.start_date);
        let end_date = valid_date("end_date", &self.end_date, false);
        if let (Ok(start), Ok(Some(end))) = (&start_date, &end_date)
            && end < start
        {
            errors.add(
                "end_date",
                field_error(ValidationError::new(
                    "end_date",
                    "must not be earlier than start_date",
                )),
            );
        }
        into_result(errors)?;

        Investment::from_fields(
            investment_id,
            parse_id("client_id", &self.client_id).map_err(rejected)?,
            parse_id("security_id", &self.security_id).map_err(rejected)?,
            parse_amount(&self.amount).map_err(rejected)?,
            start_date.map_err(rejected)?,
            end_date.map_err(rejected)?,
            valid_result(&self.result).map_err(rejected)?,
        )
        .map_err(rejected)
    }
}

impl From<&Investment> for InvestmentForm {
    fn from(i: &Investment) -> Self {
        Self {
            client_id: i.client_id().to_string(),
            security_id: i.security_id().to_string(),
            amount: i.amount().to_string(),
            start_date: i.start_date().format(DATE_FORMAT).to_string(),
            end_date: i
                .end_date()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            result: i.result().map(|r| r.to_string()).unwrap_or_default(),
        }
    }
}
