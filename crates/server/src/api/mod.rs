//! JSON API surface.
//!
//! Endpoints:
//! - `POST /api/pin`                                — PIN login (sets cookies)
//! - `GET  /api/pin`                                — current profile
//! - `POST /api/logout`                             — clear session cookies
//! - `GET/POST /api/pins`-family                    — PIN registry (admin)
//! - `GET/POST /api/customers`                      — customer registry
//! - `GET/POST /api/products`, `PUT/DELETE /{id}`   — product catalog
//! - `GET/POST /api/quotes`, `GET /{id}/document`   — quotations
//! - `POST/GET /api/quote-approvals`, `/{id}/approve` — approval workflow

use std::collections::HashMap;

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::error;

use quotedesk_core::session::{Session, PIN_COOKIE, ROLE_COOKIE};
use quotedesk_db::repositories::RepositoryError;

use crate::state::ApiState;

pub mod approvals;
pub mod customers;
pub mod pins;
pub mod products;
pub mod quotes;
pub mod session;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub type ErrorResponse = (StatusCode, Json<ApiError>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (status, Json(ApiError { error: message.into() }))
}

pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub fn unauthorized() -> ErrorResponse {
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
}

pub fn forbidden() -> ErrorResponse {
    error_response(StatusCode::FORBIDDEN, "Forbidden")
}

pub fn not_found(message: impl Into<String>) -> ErrorResponse {
    error_response(StatusCode::NOT_FOUND, message)
}

pub fn db_error(error: RepositoryError) -> ErrorResponse {
    error!(error = %error, "repository operation failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/pin", post(session::login).get(session::current_profile))
        .route("/api/logout", post(session::logout))
        .route("/api/pin/register", post(pins::register))
        .route("/api/pins", get(pins::list))
        .route("/api/pins/{id}", put(pins::update).delete(pins::remove))
        .route("/api/customers", get(customers::list).post(customers::create))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/{id}", put(products::update).delete(products::remove))
        .route("/api/quotes", get(quotes::list).post(quotes::create))
        .route("/api/quotes/{id}/document", get(quotes::document))
        .route("/api/quote-approvals", post(approvals::request_approval).get(approvals::statuses))
        .route("/api/quote-approvals/{quote_id}/approve", post(approvals::approve))
        .with_state(state)
}

/// One session-resolution step at the request boundary; handlers only see
/// the resulting `Session`.
pub fn resolve_session(headers: &HeaderMap) -> Session {
    let cookies = parse_cookies(headers);
    Session::from_cookies(
        cookies.get(PIN_COOKIE).map(String::as_str),
        cookies.get(ROLE_COOKIE).map(String::as_str),
    )
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
    cookies
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::http::{header, HeaderMap, HeaderValue};

    use quotedesk_db::repositories::memory::{
        InMemoryApprovalRepository, InMemoryCustomerRepository, InMemoryPinRepository,
        InMemoryProductRepository, InMemoryQuoteRepository,
    };
    use quotedesk_telegram::RecordingNotifier;

    use crate::state::ApiState;

    /// Typed handles onto the in-memory doubles inside an `ApiState`.
    pub struct TestHarness {
        pub state: ApiState,
        pub quotes: Arc<InMemoryQuoteRepository>,
        pub approvals: Arc<InMemoryApprovalRepository>,
        pub pins: Arc<InMemoryPinRepository>,
        pub notifier: Arc<RecordingNotifier>,
    }

    pub fn harness() -> TestHarness {
        harness_with_notifier(RecordingNotifier::new())
    }

    pub fn harness_with_notifier(notifier: RecordingNotifier) -> TestHarness {
        let quotes = Arc::new(InMemoryQuoteRepository::default());
        let approvals = Arc::new(InMemoryApprovalRepository::default());
        let pins = Arc::new(InMemoryPinRepository::default());
        let notifier = Arc::new(notifier);

        let state = ApiState {
            customers: Arc::new(InMemoryCustomerRepository::default()),
            products: Arc::new(InMemoryProductRepository::default()),
            pins: pins.clone(),
            quotes: quotes.clone(),
            approvals: approvals.clone(),
            notifier: notifier.clone(),
            base_url: Some("https://quotes.example.com".to_string()),
        };

        TestHarness { state, quotes, approvals, pins, notifier }
    }

    pub fn headers_with_session(pin: &str, role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("pin_auth={pin}; pin_role={role}"))
                .expect("valid cookie header"),
        );
        headers
    }

    pub fn anonymous_headers() -> HeaderMap {
        HeaderMap::new()
    }
}
