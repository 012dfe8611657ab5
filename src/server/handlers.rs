//! Request handlers for the function endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};

use super::SharedState;
use crate::core::api::longevity;
use crate::core::error::{ScrapeError, ValidationError};
use crate::core::models::{BirthInput, ErrorBody, RawBirthInput};

pub async fn root() -> &'static str {
    "Welcome to ssa-scraper!"
}

/// `POST /api/scrape`: look up life expectancy for the date of birth and sex
/// in the JSON body.
pub async fn scrape(State(state): State<SharedState>, body: Bytes) -> Response {
    info!("HTTP trigger processed a request for SSA scraping.");

    let input = match parse_request(&body) {
        Ok(input) => input,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    // The limiter is never closed, so acquiring only ever waits for a slot.
    let _permit = state.limiter.acquire().await.ok();

    match longevity::life_expectancy_get(&state.api, &input).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => match e.downcast_ref::<ScrapeError>() {
            // Requested date isn't offered by the calculator: caller's problem.
            Some(unavailable @ ScrapeError::OptionUnavailable { .. }) => {
                error_response(StatusCode::BAD_REQUEST, unavailable.to_string())
            }
            _ => {
                error!("An error occurred during scraping or parsing: {:#}", e);
                internal_error(&e)
            }
        },
    }
}

fn parse_request(body: &[u8]) -> Result<BirthInput, ValidationError> {
    let raw: RawBirthInput =
        serde_json::from_slice(body).map_err(|_| ValidationError::InvalidBody)?;
    raw.validate()
}

fn internal_error(e: &anyhow::Error) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("An internal error occurred: {:#}", e),
    )
}

/// JSON `{"message": ...}` response with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}
