// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::api::longevity::{self, LongevityApiConfig};
use super::models::{BirthInput, FieldValue, LifeExpectancyReport, RawBirthInput};
use super::parse;
use crate::app_config::{CompleteAppConfig, ScraperConfig};

/// Build the calculator client from config.
pub fn api_config(scraper: &ScraperConfig) -> Result<LongevityApiConfig> {
    LongevityApiConfig::new_with_params(scraper.calculator_url.clone(), scraper.timeout_secs)
}

/// Validate date of birth and sex given as command-line strings.
pub fn birth_input(month: &str, day: &str, year: &str, sex: &str) -> Result<BirthInput> {
    let text = |value: &str| Some(FieldValue::Text(value.to_owned()));
    let raw = RawBirthInput {
        month: text(month),
        day: text(day),
        year: text(year),
        sex: text(sex),
    };
    Ok(raw.validate()?)
}

/// Look up life expectancy once, using a fresh client.
pub async fn lookup(scraper: &ScraperConfig, input: &BirthInput) -> Result<LifeExpectancyReport> {
    let api_config = api_config(scraper)?;
    longevity::life_expectancy_get(&api_config, input).await
}

/// Parse a saved calculator results page.
pub fn parse_results_file(path: &Path) -> Result<LifeExpectancyReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read results page {:?}", path))?;
    parse::parse_results(&content)
        .with_context(|| format!("Could not parse results page {:?}", path))
}

/// Print a report as pretty JSON.
pub fn print_report(report: &LifeExpectancyReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Show the configuration file
pub fn print_config(config: config::Config) -> Result<()> {
    let app_config = CompleteAppConfig::from_config(config)?;
    println!("{}", toml::to_string(&app_config)?);

    Ok(())
}
