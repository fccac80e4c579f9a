//! Field validators shared by entity constructors, setters and forms.
//!
//! Every function takes raw input and returns the normalized value or a
//! [`ValidationError`] naming the field. They are public so that form handling
//! can check user input before an entity is built.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

/// One name part: capitalized word, optional hyphenated second word, optional trailing dot.
static NAME_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}\p{Ll}*(-\p{Lu}\p{Ll}*)?\.?$").unwrap());

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[78]?\d{10,11}$").unwrap());

/// Organizational-form tokens a client's `type_of_property` must mention.
pub const PROPERTY_TYPES: &[&str] = &[
    "ООО", "ОАО", "ЗАО", "ПАО", "АО", "ИП", "НКО", "LLC", "JSC", "PJSC", "Inc", "Ltd",
];

/// Date format used by records, forms and delimited strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates a record id: any non-negative integer, `0` meaning "not persisted".
pub fn valid_id(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, "must be >= 0"));
    }
    Ok(value)
}

/// Parses and validates an id given as text.
pub fn parse_id(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::new(field, "must be an integer"))?;
    valid_id(field, value)
}

/// Validates a client's full name.
///
/// The trimmed value must have two or three parts separated by single spaces,
/// each capitalized (`Ivanov`, `Petrov-Ivanov`, `I.`).
pub fn valid_name(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }

    let parts: Vec<&str> = value.split(' ').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(ValidationError::new(
            "name",
            "must consist of 2 or 3 words separated by single spaces",
        ));
    }

    if let Some(bad) = parts.iter().find(|p| !NAME_PART_REGEX.is_match(p)) {
        return Err(ValidationError::new(
            "name",
            format!("`{bad}` must start with a capital letter and contain only letters, '-' or a trailing '.'"),
        ));
    }

    Ok(value.to_string())
}

/// Validates a client's organizational form.
pub fn valid_type_of_property(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::new("type_of_property", "must not be empty"));
    }
    if !PROPERTY_TYPES.iter().any(|t| value.contains(t)) {
        return Err(ValidationError::new(
            "type_of_property",
            format!("must contain one of: {}", PROPERTY_TYPES.join(", ")),
        ));
    }
    Ok(value.to_string())
}

/// Validates a client's address.
pub fn valid_address(raw: &str) -> Result<String, ValidationError> {
    non_empty("address", raw)
}

/// Normalizes a phone number to 11 digits starting with `7`.
///
/// Accepts `+7XXXXXXXXXX`, `8XXXXXXXXXX`, `7XXXXXXXXXX` and bare ten-digit
/// local numbers.
pub fn valid_phone(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::new("phone", "must not be empty"));
    }
    if !PHONE_REGEX.is_match(raw) {
        return Err(ValidationError::new(
            "phone",
            "expected +7XXXXXXXXXX, 8XXXXXXXXXX or XXXXXXXXXX",
        ));
    }

    let mut phone = raw.strip_prefix('+').unwrap_or(raw).to_string();

    if phone.len() == 11 && phone.starts_with('8') {
        phone.replace_range(0..1, "7");
    }
    if phone.len() == 10 {
        phone.insert(0, '7');
    }

    // The pattern also admits 12-digit and non-7 11-digit strings.
    if phone.len() != 11 || !phone.starts_with('7') {
        return Err(ValidationError::new(
            "phone",
            "must normalize to 11 digits starting with 7",
        ));
    }

    Ok(phone)
}

/// Validates a security's name.
pub fn valid_security_name(raw: &str) -> Result<String, ValidationError> {
    non_empty("name", raw)
}

/// Validates a security's type.
pub fn valid_security_type(raw: &str) -> Result<String, ValidationError> {
    non_empty("security_type", raw)
}

/// Validates a security's income.
pub fn valid_income(value: f64) -> Result<f64, ValidationError> {
    finite("income", value)
}

/// Parses and validates a security's income given as text.
pub fn parse_income(raw: &str) -> Result<f64, ValidationError> {
    valid_income(parse_number("income", raw)?)
}

/// Validates a foreign key reference (`client_id`, `security_id`).
pub fn valid_foreign_key(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    valid_id(field, value)
}

/// Validates an investment amount: a finite number greater than zero.
pub fn valid_amount(value: f64) -> Result<f64, ValidationError> {
    let value = finite("amount", value)?;
    if value <= 0.0 {
        return Err(ValidationError::new("amount", "must be > 0"));
    }
    Ok(value)
}

/// Parses and validates an investment amount given as text.
pub fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    valid_amount(parse_number("amount", raw)?)
}

/// Parses an optional `YYYY-MM-DD` date.
///
/// Blank input yields `None`, or an error when `required` is set.
pub fn valid_date(
    field: &'static str,
    raw: &str,
    required: bool,
) -> Result<Option<NaiveDate>, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        if required {
            return Err(ValidationError::new(field, "is required"));
        }
        return Ok(None);
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::new(field, "must be a date in YYYY-MM-DD format"))
}

/// Parses a required `YYYY-MM-DD` date.
pub fn valid_required_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    valid_date(field, raw, true)?.ok_or_else(|| ValidationError::new(field, "is required"))
}

/// Parses an investment result; blank input means "no result yet".
pub fn valid_result(raw: &str) -> Result<Option<f64>, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(finite("result", parse_number("result", value)?)?))
}

fn non_empty(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(value.to_string())
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::new(field, "must be a number"))
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    Ok(value)
}
