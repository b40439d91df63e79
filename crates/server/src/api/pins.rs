//! PIN registry administration. Every route here requires admin
//! authority (role cookie or master PIN).

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quotedesk_core::domain::pin::{
    pin_is_well_formed, signature_image_is_valid, PinId, PinProfile, Role, PIN_LENGTH,
};

use super::{bad_request, db_error, error_response, forbidden, not_found, resolve_session, ErrorResponse};
use crate::state::ApiState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinEntry {
    pub id: String,
    pub pin: String,
    pub first_name: String,
    pub last_name: String,
    pub signature_image: String,
    pub created_at: String,
}

impl From<PinProfile> for PinEntry {
    fn from(profile: PinProfile) -> Self {
        Self {
            id: profile.id.0,
            pin: profile.pin,
            first_name: profile.first_name,
            last_name: profile.last_name,
            signature_image: profile.signature_image.unwrap_or_default(),
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub pin: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub signature_image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub pin: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Absent = keep the stored signature; empty = clear it.
    pub signature_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn require_admin(headers: &HeaderMap) -> Result<(), ErrorResponse> {
    if resolve_session(headers).is_admin() {
        Ok(())
    } else {
        Err(forbidden())
    }
}

struct ValidatedNames {
    pin: String,
    first_name: String,
    last_name: String,
}

fn validate_names(
    pin: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<ValidatedNames, ErrorResponse> {
    let first_name = first_name.unwrap_or_default().trim().to_string();
    let last_name = last_name.unwrap_or_default().trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(bad_request("first and last name are required"));
    }

    let pin = pin.unwrap_or_default().trim().to_string();
    if !pin_is_well_formed(&pin) {
        return Err(bad_request(format!("PIN must be exactly {PIN_LENGTH} digits")));
    }

    Ok(ValidatedNames { pin, first_name, last_name })
}

pub async fn list(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PinEntry>>, ErrorResponse> {
    require_admin(&headers)?;

    let profiles = state.pins.list().await.map_err(db_error)?;
    Ok(Json(profiles.into_iter().map(PinEntry::from).collect()))
}

pub async fn register(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<OkResponse>, ErrorResponse> {
    require_admin(&headers)?;

    let names = validate_names(body.pin, body.first_name, body.last_name)?;

    let role = body.role.unwrap_or_else(|| "user".to_string());
    let role = match role.trim().to_ascii_lowercase().as_str() {
        "admin" => Role::Admin,
        "user" | "" => Role::User,
        _ => return Err(bad_request("role must be admin or user")),
    };

    let signature_image = body.signature_image.unwrap_or_default().trim().to_string();
    if !signature_image_is_valid(&signature_image) {
        return Err(bad_request("signature must be an inline image"));
    }

    if state.pins.pin_taken(&names.pin, None).await.map_err(db_error)? {
        return Err(error_response(StatusCode::CONFLICT, "PIN is already in use"));
    }

    state
        .pins
        .insert(PinProfile {
            id: PinId(Uuid::new_v4().to_string()),
            pin: names.pin,
            first_name: names.first_name,
            last_name: names.last_name,
            role,
            signature_image: (!signature_image.is_empty()).then_some(signature_image),
            created_at: Utc::now(),
        })
        .await
        .map_err(db_error)?;

    Ok(Json(OkResponse { ok: true }))
}

pub async fn update(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<PinEntry>, ErrorResponse> {
    require_admin(&headers)?;

    let names = validate_names(body.pin, body.first_name, body.last_name)?;
    let signature_update = body.signature_image.map(|raw| raw.trim().to_string());
    if let Some(signature) = &signature_update {
        if !signature_image_is_valid(signature) {
            return Err(bad_request("signature must be an inline image"));
        }
    }

    let pin_id = PinId(id);
    let existing = state
        .pins
        .find_by_id(&pin_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("PIN not found"))?;

    if state.pins.pin_taken(&names.pin, Some(&pin_id)).await.map_err(db_error)? {
        return Err(error_response(StatusCode::CONFLICT, "PIN is already in use"));
    }

    let signature_image = match signature_update {
        Some(signature) => (!signature.is_empty()).then_some(signature),
        None => existing.signature_image,
    };

    let updated = PinProfile {
        id: pin_id,
        pin: names.pin,
        first_name: names.first_name,
        last_name: names.last_name,
        role: existing.role,
        signature_image,
        created_at: existing.created_at,
    };

    let stored = state
        .pins
        .update(updated)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("PIN not found"))?;

    Ok(Json(PinEntry::from(stored)))
}

pub async fn remove(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OkResponse>, ErrorResponse> {
    require_admin(&headers)?;

    let removed = state.pins.delete(&PinId(id)).await.map_err(db_error)?;
    if !removed {
        return Err(not_found("PIN not found"));
    }

    Ok(Json(OkResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        Json,
    };
    use chrono::Utc;

    use quotedesk_core::domain::pin::{PinId, PinProfile, Role};
    use quotedesk_db::repositories::PinRepository;

    use super::{register, remove, update, RegisterRequest, UpdateRequest};
    use crate::api::test_support::{harness, headers_with_session};

    fn register_body(pin: &str) -> RegisterRequest {
        RegisterRequest {
            pin: Some(pin.to_string()),
            first_name: Some("Anan".to_string()),
            last_name: Some("Chai".to_string()),
            role: Some("user".to_string()),
            signature_image: None,
        }
    }

    #[tokio::test]
    async fn register_requires_admin() {
        let harness = harness();

        let error = register(
            State(harness.state),
            headers_with_session("734592", "user"),
            Json(register_body("111333")),
        )
        .await
        .expect_err("non-admin should be rejected");
        assert_eq!(error.0, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn master_pin_may_register_without_a_role_cookie() {
        let harness = harness();

        let Json(body) = register(
            State(harness.state.clone()),
            headers_with_session("000000", "user"),
            Json(register_body("111333")),
        )
        .await
        .expect("master pin should register");
        assert!(body.ok);
        assert!(harness.pins.find_by_pin("111333").await.expect("lookup").is_some());
    }

    #[tokio::test]
    async fn duplicate_pin_registration_conflicts() {
        let harness = harness();
        register(
            State(harness.state.clone()),
            headers_with_session("000000", "admin"),
            Json(register_body("111333")),
        )
        .await
        .expect("first registration");

        let error = register(
            State(harness.state),
            headers_with_session("000000", "admin"),
            Json(register_body("111333")),
        )
        .await
        .expect_err("duplicate should conflict");
        assert_eq!(error.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn update_preserves_signature_when_field_is_absent() {
        let harness = harness();
        harness
            .pins
            .insert(PinProfile {
                id: PinId("pin-1".to_string()),
                pin: "111333".to_string(),
                first_name: "Anan".to_string(),
                last_name: "Chai".to_string(),
                role: Role::User,
                signature_image: Some("data:image/png;base64,SIG".to_string()),
                created_at: Utc::now(),
            })
            .await
            .expect("seed");

        let Json(entry) = update(
            State(harness.state),
            Path("pin-1".to_string()),
            headers_with_session("000000", "admin"),
            Json(UpdateRequest {
                pin: Some("111444".to_string()),
                first_name: Some("Anan".to_string()),
                last_name: Some("Chaiyo".to_string()),
                signature_image: None,
            }),
        )
        .await
        .expect("update should succeed");

        assert_eq!(entry.pin, "111444");
        assert_eq!(entry.signature_image, "data:image/png;base64,SIG");
    }

    #[tokio::test]
    async fn delete_of_unknown_pin_is_not_found() {
        let harness = harness();

        let error = remove(
            State(harness.state),
            Path("missing".to_string()),
            headers_with_session("000000", "admin"),
        )
        .await
        .expect_err("should 404");
        assert_eq!(error.0, StatusCode::NOT_FOUND);
    }
}
