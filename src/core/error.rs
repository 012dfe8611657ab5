// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! Error kinds that callers need to tell apart.
//!
//! Everything else travels as a plain `anyhow::Error` with context attached.
//! These types are recovered from an `anyhow::Error` with `downcast_ref`.

use thiserror::Error;

/// The lookup request itself is unusable.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid request body. Please pass JSON with month, day, year, and sex.")]
    InvalidBody,
    #[error("Missing one or more required parameters: month, day, year, sex.")]
    MissingParameters,
    #[error("Parameter '{field}' must be a whole number, got '{value}'.")]
    NotANumber { field: &'static str, value: String },
    #[error("Parameter 'sex' must be 'm' or 'f', got '{0}'.")]
    UnknownSex(String),
    #[error("Date of birth is not valid: year {year}, month {month}, day {day}.")]
    InvalidDate { year: i64, month: i64, day: i64 },
}

/// The calculator pages did not look the way we expect.
#[derive(Debug, Error, PartialEq)]
pub enum ScrapeError {
    #[error("Could not find the calculator form on the SSA page. The page structure may have changed.")]
    FormNotFound,
    #[error("The SSA calculator does not offer '{value}' for field '{field}'.")]
    OptionUnavailable { field: &'static str, value: String },
    #[error("Could not find the results table on the SSA page. The page structure may have changed.")]
    ResultsTableNotFound,
    #[error("Failed to parse initial life expectancy data from the table.")]
    InitialRowMissing,
    #[error("Malformed life expectancy value '{0}' in results table.")]
    MalformedValue(String),
}
