//! Interact with the SSA longevity calculator.
//!
//! The calculator is a plain HTML form posting to a CGI script: we load the
//! form page, fill in the date of birth and sex, submit it, and read the
//! results table off the page that comes back.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::Url;

use crate::core::models::{BirthInput, LifeExpectancyReport};
use crate::core::parse::{self, CalculatorForm, FormMethod};

/// Address of the public calculator.
pub const DEFAULT_CALCULATOR_URL: &str = "https://www.ssa.gov/cgi-bin/longevity.cgi";

/// Seconds to wait for the calculator before giving up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for interacting with the longevity calculator.
pub struct LongevityApiConfig {
    /// Calculator page URL
    pub calculator_url: Url,
    /// HTTP client
    pub client: reqwest::Client,
}

impl LongevityApiConfig {
    /// Configure HTTP client with user-agent and timeout.
    ///
    /// The client is shared by every lookup, so it keeps no cookies of its
    /// own; see [`CalculatorSession`].
    pub fn new_with_params(calculator_url: Url, timeout: u64) -> Result<Self> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"),);
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(Duration::from_secs(timeout))
                .build()?,
            calculator_url,
        })
    }

    pub fn new(calculator_url: Url) -> Result<Self> {
        Self::new_with_params(calculator_url, DEFAULT_TIMEOUT_SECS)
    }
}

/// One visit to the calculator: the form as served, and the cookies that were
/// set along with it. The cookies go back with the submit and nowhere else.
#[derive(Debug)]
pub struct CalculatorSession {
    pub form: CalculatorForm,
    /// Value for the `Cookie` header, if the form page set any cookies.
    pub cookie: Option<String>,
}

/// Collect the `name=value` pairs of every `Set-Cookie` header into a single
/// `Cookie` header value. Cookie attributes (path, expiry, ...) are dropped.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Load the calculator page and read its form.
///
/// # Errors
///
/// Returns an error if the calculator returns a non-200 response (e.g. if the
/// site is down or unreachable) or if the page doesn't contain the calculator
/// form.
pub async fn calculator_form_get(configuration: &LongevityApiConfig) -> Result<CalculatorSession> {
    debug!("building get request for: {}", configuration.calculator_url);
    let client = &configuration.client;

    let response = client
        .get(configuration.calculator_url.as_str())
        .send()
        .await?;
    response.error_for_status_ref()?;

    debug!("status: {}", response.status());
    let cookie = session_cookie(response.headers());
    let content = response.text().await?;
    debug!("content length: {}", content.len());

    let form = parse::parse_form(&content, &configuration.calculator_url)?;
    Ok(CalculatorSession { form, cookie })
}

/// Submit the calculator form for `input` and return the results page HTML.
///
/// # Errors
///
/// Returns an error if the requested date of birth isn't offered by the form,
/// or if the calculator returns a non-200 response.
pub async fn calculator_form_submit(
    configuration: &LongevityApiConfig,
    session: &CalculatorSession,
    input: &BirthInput,
) -> Result<String> {
    let form = &session.form;
    let fields = form.fields_for(input)?;
    debug!(
        "building {:?} request for: {} {:?}",
        form.method, form.action, fields
    );
    let client = &configuration.client;

    let mut req_builder = match form.method {
        FormMethod::Post => client.post(form.action.as_str()).form(&fields),
        FormMethod::Get => client.get(form.action.as_str()).query(&fields),
    };
    if let Some(cookie) = &session.cookie {
        req_builder = req_builder.header(COOKIE, cookie.as_str());
    }

    let response = req_builder.send().await?;
    response.error_for_status_ref()?;

    debug!("status: {}", response.status());
    let content = response.text().await?;
    debug!("content length: {}", content.len());

    Ok(content)
}

/// Look up life expectancy for a date of birth and sex.
///
/// # Errors
///
/// Returns an error if either calculator request fails or if the results page
/// can't be parsed.
pub async fn life_expectancy_get(
    configuration: &LongevityApiConfig,
    input: &BirthInput,
) -> Result<LifeExpectancyReport> {
    let session = calculator_form_get(configuration)
        .await
        .context("Failed to load the SSA calculator form")?;
    info!("Calculator form loaded from {}", configuration.calculator_url);

    let content = calculator_form_submit(configuration, &session, input)
        .await
        .context("Failed to submit the SSA calculator form")?;
    info!(
        "Calculator form submitted for {:?} born {}-{}-{}",
        input.sex, input.year, input.month, input.day
    );

    let report = parse::parse_results(&content)?;
    info!(
        "Parsed life expectancy: initial {:?}, {} future points",
        report.initial,
        report.future.len()
    );
    Ok(report)
}
