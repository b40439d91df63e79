use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::AppendHeaders,
    Json,
};
use serde::{Deserialize, Serialize};

use quotedesk_core::domain::pin::{pin_is_well_formed, PIN_LENGTH};
use quotedesk_core::session::{PIN_COOKIE, ROLE_COOKIE};

use super::{db_error, error_response, resolve_session, ErrorResponse};
use crate::state::ApiState;

/// Session cookies live for one hour, matching the login screen's
/// "re-enter your PIN hourly" expectation.
const SESSION_TTL_SECS: i64 = 3600;

type CookieHeaders = AppendHeaders<[(axum::http::HeaderName, String); 2]>;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub pin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub signature_image: String,
}

impl ProfileResponse {
    fn anonymous() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            role: "user".to_string(),
            signature_image: String::new(),
        }
    }
}

fn session_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!("{name}={value}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax")
}

pub async fn login(
    State(state): State<ApiState>,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieHeaders, Json<OkResponse>), ErrorResponse> {
    let pin = body.pin.unwrap_or_default().trim().to_string();
    if !pin_is_well_formed(&pin) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("PIN must be exactly {PIN_LENGTH} digits"),
        ));
    }

    let profile = state
        .pins
        .find_by_pin(&pin)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Invalid PIN"))?;

    let headers = AppendHeaders([
        (SET_COOKIE, session_cookie(PIN_COOKIE, &pin, SESSION_TTL_SECS)),
        (SET_COOKIE, session_cookie(ROLE_COOKIE, profile.role.as_str(), SESSION_TTL_SECS)),
    ]);

    Ok((headers, Json(OkResponse { ok: true })))
}

pub async fn current_profile(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ErrorResponse> {
    let session = resolve_session(&headers);
    if !session.is_authenticated() {
        return Ok(Json(ProfileResponse::anonymous()));
    }

    let profile = state.pins.find_by_pin(&session.pin).await.map_err(db_error)?;
    let response = match profile {
        Some(profile) => ProfileResponse {
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: profile.role.as_str().to_string(),
            signature_image: profile.signature_image.unwrap_or_default(),
        },
        None => ProfileResponse::anonymous(),
    };

    Ok(Json(response))
}

pub async fn logout() -> (CookieHeaders, Json<OkResponse>) {
    let headers = AppendHeaders([
        (SET_COOKIE, session_cookie(PIN_COOKIE, "", 0)),
        (SET_COOKIE, session_cookie(ROLE_COOKIE, "", 0)),
    ]);

    (headers, Json(OkResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use chrono::Utc;

    use quotedesk_core::domain::pin::{PinId, PinProfile, Role};
    use quotedesk_db::repositories::PinRepository;

    use super::{current_profile, login, LoginRequest};
    use crate::api::test_support::{harness, headers_with_session};

    fn profile(pin: &str, role: Role) -> PinProfile {
        PinProfile {
            id: PinId(format!("pin-{pin}")),
            pin: pin.to_string(),
            first_name: "Somsri".to_string(),
            last_name: "Wong".to_string(),
            role,
            signature_image: Some("data:image/png;base64,AAA".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn login_sets_both_session_cookies() {
        let harness = harness();
        harness.pins.insert(profile("482913", Role::Admin)).await.expect("seed pin");

        let (headers, Json(body)) =
            login(State(harness.state), Json(LoginRequest { pin: Some("482913".to_string()) }))
                .await
                .expect("login should succeed");

        assert!(body.ok);
        let cookies = headers.0;
        assert!(cookies[0].1.starts_with("pin_auth=482913"));
        assert!(cookies[1].1.starts_with("pin_role=admin"));
    }

    #[tokio::test]
    async fn malformed_pin_is_rejected_before_lookup() {
        let harness = harness();

        let error = login(
            State(harness.state),
            Json(LoginRequest { pin: Some("12ab".to_string()) }),
        )
        .await
        .expect_err("should fail");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_pin_is_unauthorized() {
        let harness = harness();

        let error = login(
            State(harness.state),
            Json(LoginRequest { pin: Some("999999".to_string()) }),
        )
        .await
        .expect_err("should fail");
        assert_eq!(error.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_endpoint_returns_defaults_when_anonymous() {
        let harness = harness();

        let Json(body) = current_profile(State(harness.state), Default::default())
            .await
            .expect("should succeed");
        assert_eq!(body.role, "user");
        assert!(body.first_name.is_empty());
    }

    #[tokio::test]
    async fn profile_endpoint_resolves_names_from_the_pin() {
        let harness = harness();
        harness.pins.insert(profile("482913", Role::User)).await.expect("seed pin");

        let Json(body) =
            current_profile(State(harness.state), headers_with_session("482913", "user"))
                .await
                .expect("should succeed");
        assert_eq!(body.first_name, "Somsri");
        assert_eq!(body.signature_image, "data:image/png;base64,AAA");
    }
}
