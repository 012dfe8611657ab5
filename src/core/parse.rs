// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! Reading the longevity calculator's HTML.
//!
//! Two pages matter: the calculator page, whose form we fill in, and the
//! results page, whose life-expectancy table we turn into a
//! [LifeExpectancyReport]. Everything in here is pure (no network) so it can be
//! exercised against saved pages.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::core::error::ScrapeError;
use crate::core::models::{BirthInput, LifeExpectancyPoint, LifeExpectancyReport};

/// Text that only appears in the results table.
const RESULTS_TABLE_MARKER: &str = "At Age";

pub const SEX_FIELD: &str = "sex";
pub const MONTH_FIELD: &str = "monthofbirth";
pub const DAY_FIELD: &str = "dayofbirth";
pub const YEAR_FIELD: &str = "yearofbirth";

lazy_static! {
    static ref LETTERS: Regex = Regex::new(r"[a-zA-Z]").expect("valid regex");
    static ref NUMBER: Regex = Regex::new(r"\d+\.?\d*").expect("valid regex");
    static ref TABLE: Selector = Selector::parse("table").expect("valid selector");
    static ref ROW: Selector = Selector::parse("tr").expect("valid selector");
    static ref CELL: Selector = Selector::parse("td").expect("valid selector");
    static ref FORM: Selector = Selector::parse("form").expect("valid selector");
    static ref SEX_SELECT: Selector =
        Selector::parse(r#"select[name="sex"]"#).expect("valid selector");
    static ref HIDDEN_INPUT: Selector =
        Selector::parse(r#"input[type="hidden"]"#).expect("valid selector");
    static ref SUBMIT_INPUT: Selector =
        Selector::parse(r#"input[type="submit"]"#).expect("valid selector");
    static ref OPTION: Selector = Selector::parse("option").expect("valid selector");
}

/// Converts an age cell like "62 and 4 months" or "70b" into fractional years.
///
/// Letters (footnote markers, "and", "months") are dropped first. One number
/// is taken as whole years; two numbers as years and months.
pub fn parse_age(text: &str) -> Option<f64> {
    let cleaned = LETTERS.replace_all(text, "");
    let parts = NUMBER
        .find_iter(cleaned.trim())
        .map(|m| m.as_str().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    match parts.as_slice() {
        [years, months] => Some(years + months / 12.0),
        [years] => Some(*years),
        _ => None,
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// Extracts the life-expectancy table from a calculator results page.
///
/// The first table mentioning "At Age" is used; its header row is skipped and
/// only rows with exactly three cells and a readable age are kept. The first
/// kept row is the current life expectancy, the rest are later ages.
///
/// # Errors
///
/// Returns [ScrapeError::ResultsTableNotFound] if no such table exists,
/// [ScrapeError::MalformedValue] if an expectancy cell isn't a number, and
/// [ScrapeError::InitialRowMissing] if the table has no usable rows.
pub fn parse_results(html: &str) -> Result<LifeExpectancyReport> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE)
        .find(|table| element_text(table).contains(RESULTS_TABLE_MARKER))
        .ok_or(ScrapeError::ResultsTableNotFound)?;

    let mut points = Vec::new();
    for row in table.select(&ROW).skip(1) {
        let cols = row
            .select(&CELL)
            .map(|cell| element_text(&cell).trim().to_owned())
            .collect::<Vec<_>>();
        if let [age, additional, total] = cols.as_slice() {
            let at_age = match parse_age(age) {
                Some(at_age) => at_age,
                None => {
                    debug!("skipping row with unreadable age: {:?}", age);
                    continue;
                }
            };
            points.push(LifeExpectancyPoint {
                at_age,
                additional_le: parse_expectancy(additional)?,
                total_le: parse_expectancy(total)?,
            });
        }
    }

    let mut points = points.into_iter();
    let initial = points.next().ok_or(ScrapeError::InitialRowMissing)?;
    Ok(LifeExpectancyReport {
        initial,
        future: points.collect(),
    })
}

fn parse_expectancy(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| ScrapeError::MalformedValue(text.to_owned()).into())
}

/// How the calculator form is submitted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormMethod {
    Get,
    Post,
}

/// Everything needed to submit the calculator form without a browser.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorForm {
    /// Absolute URL the form submits to.
    pub action: Url,
    pub method: FormMethod,
    /// Hidden inputs, sent along verbatim.
    pub hidden: Vec<(String, String)>,
    /// Named submit button, if the button carries a name.
    pub submit: Option<(String, String)>,
    pub sex_options: Vec<String>,
    pub month_options: Vec<String>,
    pub day_options: Vec<String>,
    pub year_options: Vec<String>,
}

impl CalculatorForm {
    /// Builds the field list to submit for `input`, in page order.
    ///
    /// # Errors
    ///
    /// Returns [ScrapeError::OptionUnavailable] if the page lists options for a
    /// select and the requested value isn't one of them. Selects that are
    /// filled in by script have no options in the page and are not checked.
    pub fn fields_for(&self, input: &BirthInput) -> Result<Vec<(String, String)>> {
        let selected = [
            (SEX_FIELD, &self.sex_options, input.sex.form_value().to_owned()),
            (MONTH_FIELD, &self.month_options, input.form_month()),
            (DAY_FIELD, &self.day_options, input.form_day()),
            (YEAR_FIELD, &self.year_options, input.form_year()),
        ];

        let mut fields = self.hidden.clone();
        for (field, options, value) in selected.iter() {
            if !options.is_empty() && !options.contains(value) {
                return Err(ScrapeError::OptionUnavailable {
                    field: *field,
                    value: value.clone(),
                }
                .into());
            }
            fields.push((field.to_string(), value.clone()));
        }
        if let Some(submit) = &self.submit {
            fields.push(submit.clone());
        }
        Ok(fields)
    }
}

/// Reads the calculator form out of the calculator page at `page_url`.
///
/// # Errors
///
/// Returns [ScrapeError::FormNotFound] if no form has a `sex` select, or an
/// error if the form's action can't be resolved to a URL.
pub fn parse_form(html: &str, page_url: &Url) -> Result<CalculatorForm> {
    let document = Html::parse_document(html);

    let form = document
        .select(&FORM)
        .find(|form| form.select(&SEX_SELECT).next().is_some())
        .ok_or(ScrapeError::FormNotFound)?;

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => page_url
            .join(action)
            .with_context(|| format!("Form action is not a valid URL: {}", action))?,
        _ => page_url.clone(),
    };

    let method = match form.value().attr("method") {
        Some(method) if method.trim().eq_ignore_ascii_case("post") => FormMethod::Post,
        _ => FormMethod::Get,
    };

    let hidden = form
        .select(&HIDDEN_INPUT)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_owned(), value.to_owned()))
        })
        .collect();

    let submits = form.select(&SUBMIT_INPUT).collect::<Vec<_>>();
    let submit = submits
        .iter()
        .find(|input| input.value().attr("value") == Some("Submit"))
        .or_else(|| submits.first())
        .and_then(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_owned(), value.to_owned()))
        });

    let calculator_form = CalculatorForm {
        action,
        method,
        hidden,
        submit,
        sex_options: select_options(&form, SEX_FIELD),
        month_options: select_options(&form, MONTH_FIELD),
        day_options: select_options(&form, DAY_FIELD),
        year_options: select_options(&form, YEAR_FIELD),
    };
    debug!("parsed calculator form: {:?}", calculator_form);
    Ok(calculator_form)
}

/// Non-empty option values of the named select; an option without a `value`
/// attribute submits its text, as browsers do.
fn select_options(form: &ElementRef, name: &str) -> Vec<String> {
    let selector = match Selector::parse(&format!(r#"select[name="{}"]"#, name)) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    form.select(&selector)
        .next()
        .map(|select| {
            select
                .select(&OPTION)
                .map(|option| match option.value().attr("value") {
                    Some(value) => value.trim().to_owned(),
                    None => element_text(&option).trim().to_owned(),
                })
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::core::models::Sex;

    use super::*;

    const RESULTS_PAGE: &str = include_str!("../resources/longevity_results.html");
    const FORM_PAGE: &str = include_str!("../resources/longevity_form.html");

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn page_url() -> Url {
        Url::parse("https://www.ssa.gov/cgi-bin/longevity.cgi").unwrap()
    }

    #[test]
    fn test_parse_age() {
        assert_close(parse_age("62 and 4 months").unwrap(), 62.0 + 4.0 / 12.0);
        assert_close(parse_age("70b").unwrap(), 70.0);
        assert_close(parse_age(" 66 and 10 months a ").unwrap(), 66.0 + 10.0 / 12.0);
        assert_close(parse_age("67.5").unwrap(), 67.5);
        assert_eq!(parse_age(""), None);
        assert_eq!(parse_age("At Age"), None);
        assert_eq!(parse_age("1 2 3"), None);
    }

    #[test]
    fn test_parse_results_fixture() {
        let report = parse_results(RESULTS_PAGE).unwrap();

        assert_close(report.initial.at_age, 64.0 + 3.0 / 12.0);
        assert_close(report.initial.additional_le, 21.4);
        assert_close(report.initial.total_le, 85.7);

        // Footnote row and the row with an unreadable age are skipped.
        assert_eq!(report.future.len(), 3);
        assert_close(report.future[0].at_age, 66.0 + 10.0 / 12.0);
        assert_close(report.future[1].at_age, 67.0);
        assert_close(report.future[2].at_age, 70.0);
        assert_close(report.future[2].total_le, 86.6);
    }

    #[test]
    fn test_parse_results_skips_header_row() {
        // The first row is dropped even though it has three numeric cells.
        let html = r#"<table>
            <tr><td>60</td><td>1.0</td><td>61.0</td></tr>
            <tr><td>At Age 62</td><td>20.0</td><td>82.0</td></tr>
        </table>"#;
        let report = parse_results(html).unwrap();
        assert_close(report.initial.at_age, 62.0);
        assert!(report.future.is_empty());
    }

    #[test]
    fn test_parse_results_missing_table() {
        let html = "<html><body><table><tr><td>Nothing here</td></tr></table></body></html>";
        let error = parse_results(html).expect_err("Expected missing table");
        assert_eq!(
            error.downcast_ref::<ScrapeError>(),
            Some(&ScrapeError::ResultsTableNotFound)
        );
        assert!(error
            .to_string()
            .contains("Could not find the results table on the SSA page"));
    }

    #[test]
    fn test_parse_results_no_usable_rows() {
        let html = r#"<table>
            <tr><th>At Age</th><th>Additional</th><th>Total</th></tr>
            <tr><td colspan="3">No data available</td></tr>
        </table>"#;
        let error = parse_results(html).expect_err("Expected missing initial row");
        assert_eq!(
            error.downcast_ref::<ScrapeError>(),
            Some(&ScrapeError::InitialRowMissing)
        );
    }

    #[test]
    fn test_parse_results_malformed_value() {
        let html = r#"<table>
            <tr><th>At Age</th><th>Additional</th><th>Total</th></tr>
            <tr><td>62</td><td>n/a</td><td>84.0</td></tr>
        </table>"#;
        let error = parse_results(html).expect_err("Expected malformed value");
        assert_eq!(
            error.downcast_ref::<ScrapeError>(),
            Some(&ScrapeError::MalformedValue("n/a".to_owned()))
        );
    }

    #[test]
    fn test_parse_form_fixture() {
        let form = parse_form(FORM_PAGE, &page_url()).unwrap();

        assert_eq!(
            form.action.as_str(),
            "https://www.ssa.gov/cgi-bin/longevity.cgi"
        );
        assert_eq!(form.method, FormMethod::Post);
        assert_eq!(
            form.hidden,
            vec![("submitted".to_owned(), "1".to_owned())]
        );
        assert_eq!(
            form.submit,
            Some(("submit".to_owned(), "Submit".to_owned()))
        );
        // Placeholder option with an empty value is not a real choice.
        assert_eq!(form.sex_options, vec!["m", "f"]);
        assert_eq!(form.month_options.len(), 12);
        assert_eq!(form.month_options[0], "0");
        assert!(form.day_options.is_empty());
        assert!(form.year_options.contains(&"1960".to_owned()));
    }

    #[test]
    fn test_parse_form_relative_action_and_default_method() {
        let html = r#"<form action="submit.cgi">
            <select name="sex"><option>m</option><option>f</option></select>
        </form>"#;
        let form = parse_form(html, &page_url()).unwrap();
        assert_eq!(form.action.as_str(), "https://www.ssa.gov/cgi-bin/submit.cgi");
        assert_eq!(form.method, FormMethod::Get);
        assert_eq!(form.sex_options, vec!["m", "f"]);
        assert_eq!(form.submit, None);
    }

    #[test]
    fn test_parse_form_missing() {
        let html = r#"<form action="/search"><input name="q"></form>"#;
        let error = parse_form(html, &page_url()).expect_err("Expected missing form");
        assert_eq!(
            error.downcast_ref::<ScrapeError>(),
            Some(&ScrapeError::FormNotFound)
        );
    }

    #[test]
    fn test_fields_for() {
        let form = parse_form(FORM_PAGE, &page_url()).unwrap();
        let input = BirthInput::new(3, 14, 1960, Sex::Female).unwrap();

        let fields = form.fields_for(&input).unwrap();
        let expected = vec![
            ("submitted", "1"),
            ("sex", "f"),
            ("monthofbirth", "2"),
            ("dayofbirth", "14"),
            ("yearofbirth", "1960"),
            ("submit", "Submit"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect::<Vec<_>>();
        assert_eq!(fields, expected);
    }

    #[test]
    fn test_fields_for_unavailable_year() {
        let form = parse_form(FORM_PAGE, &page_url()).unwrap();
        let input = BirthInput::new(3, 14, 1890, Sex::Male).unwrap();

        let error = form
            .fields_for(&input)
            .expect_err("Expected year to be unavailable");
        assert_eq!(
            error.downcast_ref::<ScrapeError>(),
            Some(&ScrapeError::OptionUnavailable {
                field: "yearofbirth",
                value: "1890".to_owned()
            })
        );
    }
}
