// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! Serialization to/from lookup requests and life-expectancy results.

use std::convert::TryFrom;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use crate::core::error::ValidationError;

/// Sex as understood by the calculator form.
///
/// Parsing accepts `m`/`f`/`male`/`female`; callers lowercase first.
#[derive(Clone, Copy, Debug, PartialEq, EnumString)]
pub enum Sex {
    #[strum(serialize = "m", serialize = "male")]
    Male,
    #[strum(serialize = "f", serialize = "female")]
    Female,
}

impl Sex {
    /// Option value used by the calculator's `sex` select.
    pub fn form_value(&self) -> &'static str {
        match *self {
            Sex::Male => "m",
            Sex::Female => "f",
        }
    }
}

/// A request value that may arrive either as a JSON string or a JSON number.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    fn as_trimmed(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_owned(),
        }
    }
}

/// Lookup request body as received over the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawBirthInput {
    pub month: Option<FieldValue>,
    pub day: Option<FieldValue>,
    pub year: Option<FieldValue>,
    pub sex: Option<FieldValue>,
}

impl RawBirthInput {
    /// Checks that every field is present and sensible.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::MissingParameters] if any field is absent or
    /// empty, and a more specific [ValidationError] for values that can't be
    /// used (non-numeric month, unknown sex, impossible date...).
    pub fn validate(&self) -> Result<BirthInput, ValidationError> {
        let values = vec![&self.month, &self.day, &self.year, &self.sex]
            .into_iter()
            .map(|v| v.as_ref().map(FieldValue::as_trimmed).unwrap_or_default())
            .collect::<Vec<_>>();
        if values.iter().any(String::is_empty) {
            return Err(ValidationError::MissingParameters);
        }

        let month = parse_whole("month", &values[0])?;
        let day = parse_whole("day", &values[1])?;
        let year = parse_whole("year", &values[2])?;
        let sex = Sex::from_str(&values[3].to_ascii_lowercase())
            .map_err(|_| ValidationError::UnknownSex(values[3].clone()))?;

        BirthInput::new(month, day, year, sex)
    }
}

fn parse_whole(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    value
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: value.to_owned(),
        })
}

/// A validated date of birth and sex.
#[derive(Clone, Debug, PartialEq)]
pub struct BirthInput {
    /// Calendar month, 1 through 12.
    pub month: u32,
    pub day: u32,
    pub year: i32,
    pub sex: Sex,
}

impl BirthInput {
    /// # Errors
    ///
    /// Returns [ValidationError::InvalidDate] unless the values form a real
    /// calendar date.
    pub fn new(month: i64, day: i64, year: i64, sex: Sex) -> Result<Self, ValidationError> {
        let date = (
            i32::try_from(year),
            u32::try_from(month),
            u32::try_from(day),
        );
        match date {
            (Ok(year), Ok(month), Ok(day)) if NaiveDate::from_ymd_opt(year, month, day).is_some() => {
                Ok(Self {
                    month,
                    day,
                    year,
                    sex,
                })
            }
            _ => Err(ValidationError::InvalidDate { year, month, day }),
        }
    }

    /// The calculator's month select is zero-based (January is "0").
    pub fn form_month(&self) -> String {
        (self.month - 1).to_string()
    }

    pub fn form_day(&self) -> String {
        self.day.to_string()
    }

    pub fn form_year(&self) -> String {
        self.year.to_string()
    }
}

/// One row of the calculator's results table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifeExpectancyPoint {
    /// Age in years; "62 and 4 months" becomes 62.333...
    #[serde(rename = "atAge")]
    pub at_age: f64,
    /// Expected years of life remaining at `at_age`.
    #[serde(rename = "additionalLE")]
    pub additional_le: f64,
    /// Expected age at death, as seen from `at_age`.
    #[serde(rename = "totalLE")]
    pub total_le: f64,
}

/// Life expectancy now (`initial`) and at the later ages the calculator lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifeExpectancyReport {
    pub initial: LifeExpectancyPoint,
    pub future: Vec<LifeExpectancyPoint>,
}

/// JSON body of every non-200 response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
