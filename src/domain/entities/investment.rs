//! Investment entity: a client's position in a security over a period.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::Entity;
use super::record::{Record, split_delimited};
use crate::domain::validation::{
    DATE_FORMAT, parse_amount, parse_id, valid_amount, valid_date, valid_foreign_key, valid_id,
    valid_required_date, valid_result,
};
use crate::error::{EntityError, ValidationError};

const DELIMITED_FIELDS: [&str; 7] = [
    "investment_id",
    "client_id",
    "security_id",
    "amount",
    "start_date",
    "end_date",
    "result",
];

/// An amount a client has put into a security.
///
/// `client_id` and `security_id` are plain references; whether they point at
/// existing records is up to the storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Investment {
    investment_id: i64,
    client_id: i64,
    security_id: i64,
    amount: f64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    result: Option<f64>,
}

impl Investment {
    /// Creates an investment, validating every field.
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        investment_id: i64,
        client_id: i64,
        security_id: i64,
        amount: f64,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        result: Option<f64>,
    ) -> Result<Self, ValidationError> {
        if let Some(r) = result
            && !r.is_finite()
        {
            return Err(ValidationError::new("result", "must be a finite number"));
        }

        Ok(Self {
            investment_id: valid_id("investment_id", investment_id)?,
            client_id: valid_foreign_key("client_id", client_id)?,
            security_id: valid_foreign_key("security_id", security_id)?,
            amount: valid_amount(amount)?,
            start_date,
            end_date,
            result,
        })
    }

    /// Creates an investment from a mapping.
    ///
    /// Dates are `YYYY-MM-DD` text; `end_date` and `result` may be absent,
    /// null or empty.
    pub fn from_record(record: &Value) -> Result<Self, EntityError> {
        let record = Record::new(Self::KIND, record)?;
        Ok(Self::from_fields(
            record.integer_or("investment_id", 0)?,
            record.integer("client_id")?,
            record.integer("security_id")?,
            parse_amount(&record.text("amount")?)?,
            valid_required_date("start_date", &record.text("start_date")?)?,
            valid_date("end_date", &record.optional_text("end_date")?, false)?,
            valid_result(&record.optional_text("result")?)?,
        )?)
    }

    /// Creates an investment from
    /// `id;client_id;security_id;amount;start_date;end_date[;result]`.
    pub fn from_delimited(line: &str) -> Result<Self, EntityError> {
        let parts = split_delimited(Self::KIND, line, &DELIMITED_FIELDS, 6)?;
        Ok(Self::from_fields(
            parse_id("investment_id", parts[0])?,
            parse_id("client_id", parts[1])?,
            parse_id("security_id", parts[2])?,
            parse_amount(parts[3])?,
            valid_required_date("start_date", parts[4])?,
            valid_date("end_date", parts[5], false)?,
            valid_result(parts.get(6).copied().unwrap_or_default())?,
        )?)
    }

    pub fn investment_id(&self) -> i64 {
        self.investment_id
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn security_id(&self) -> i64 {
        self.security_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn result(&self) -> Option<f64> {
        self.result
    }

    pub fn set_investment_id(&mut self, investment_id: i64) -> Result<(), ValidationError> {
        self.investment_id = valid_id("investment_id", investment_id)?;
        Ok(())
    }

    pub fn set_client_id(&mut self, client_id: i64) -> Result<(), ValidationError> {
        self.client_id = valid_foreign_key("client_id", client_id)?;
        Ok(())
    }

    pub fn set_security_id(&mut self, security_id: i64) -> Result<(), ValidationError> {
        self.security_id = valid_foreign_key("security_id", security_id)?;
        Ok(())
    }

    pub fn set_amount(&mut self, amount: f64) -> Result<(), ValidationError> {
        self.amount = valid_amount(amount)?;
        Ok(())
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = start_date;
    }

    pub fn set_end_date(&mut self, end_date: Option<NaiveDate>) {
        self.end_date = end_date;
    }

    /// Sets the result from raw text; blank clears it.
    pub fn set_result(&mut self, raw: &str) -> Result<(), ValidationError> {
        self.result = valid_result(raw)?;
        Ok(())
    }
}

impl Entity for Investment {
    type Short = InvestmentShort;

    const KIND: &'static str = "investment";
    const COLLECTION: &'static str = "investments";
    const ID_FIELD: &'static str = "investment_id";

    fn id(&self) -> i64 {
        self.investment_id
    }

    fn set_id(&mut self, id: i64) -> Result<(), ValidationError> {
        self.set_investment_id(id)
    }

    /// Investments carry no name; they order by start date.
    fn name_key(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    fn from_record(record: &Value) -> Result<Self, EntityError> {
        Investment::from_record(record)
    }

    fn to_short(&self) -> InvestmentShort {
        InvestmentShort::from(self)
    }
}

impl FromStr for Investment {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_delimited(s)
    }
}

impl fmt::Display for Investment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "…".to_string());
        let result = self
            .result
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} | client={} | security={} | amount={} | {} → {} | result={}",
            self.investment_id,
            self.client_id,
            self.security_id,
            self.amount,
            self.start_date,
            end,
            result
        )
    }
}

/// List view of an investment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentShort {
    pub investment_id: i64,
    pub client_id: i64,
    pub security_id: i64,
    pub amount: f64,
}

impl From<&Investment> for InvestmentShort {
    fn from(inv: &Investment) -> Self {
        Self {
            investment_id: inv.investment_id,
            client_id: inv.client_id,
            security_id: inv.security_id,
            amount: inv.amount,
        }
    }
}
