//! Function-key authorization.
//!
//! A caller proves it may use the function by sending one of the configured
//! keys, either in the `x-functions-key` header or as the `code` query
//! parameter. With no keys configured every request is let through.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use log::warn;
use subtle::ConstantTimeEq;

use super::handlers::error_response;
use super::SharedState;

pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";
pub const FUNCTION_KEY_QUERY_PARAM: &str = "code";

/// Middleware rejecting requests without a known function key.
pub async fn require_function_key(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    if state.function_keys.is_empty() {
        return next.run(req).await;
    }

    match extract_function_key(&req) {
        Some(key) if is_known_key(&state.function_keys, &key) => next.run(req).await,
        Some(_) => {
            warn!("Rejected request to {}: unknown function key", req.uri().path());
            error_response(StatusCode::UNAUTHORIZED, "Invalid function key.")
        }
        None => {
            warn!("Rejected request to {}: missing function key", req.uri().path());
            error_response(StatusCode::UNAUTHORIZED, "Missing function key.")
        }
    }
}

/// Compares in constant time; only the key lengths can leak.
fn is_known_key(function_keys: &[String], key: &str) -> bool {
    function_keys
        .iter()
        .any(|known| bool::from(known.as_bytes().ct_eq(key.as_bytes())))
}

/// Header takes precedence over the query parameter.
fn extract_function_key(req: &Request) -> Option<String> {
    let from_header = req
        .headers()
        .get(FUNCTION_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    from_header.or_else(|| {
        let query = req.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == FUNCTION_KEY_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(uri: &str, header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(key) = header {
            builder = builder.header(FUNCTION_KEY_HEADER, key);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_function_key_header() {
        let req = request("/api/scrape", Some("header-key"));
        assert_eq!(extract_function_key(&req), Some("header-key".to_owned()));
    }

    #[test]
    fn test_extract_function_key_query() {
        let req = request("/api/scrape?foo=bar&code=query%2Bkey", None);
        assert_eq!(extract_function_key(&req), Some("query+key".to_owned()));
    }

    #[test]
    fn test_extract_function_key_header_wins() {
        let req = request("/api/scrape?code=query-key", Some("header-key"));
        assert_eq!(extract_function_key(&req), Some("header-key".to_owned()));
    }

    #[test]
    fn test_is_known_key() {
        let keys = vec!["first-key".to_owned(), "second-key".to_owned()];

        assert!(is_known_key(&keys, "first-key"));
        assert!(is_known_key(&keys, "second-key"));
        assert!(!is_known_key(&keys, "first"));
        assert!(!is_known_key(&keys, "first-key-and-more"));
        assert!(!is_known_key(&keys, "FIRST-KEY"));
        assert!(!is_known_key(&keys, ""));
        assert!(!is_known_key(&[], "first-key"));
    }

    #[test]
    fn test_extract_function_key_missing() {
        let req = request("/api/scrape?foo=bar", None);
        assert_eq!(extract_function_key(&req), None);
    }
}
