//! Approval workflow endpoints.
//!
//! Requesting approval is guarded by the cooldown gate and paired with a
//! Telegram alert. The pairing is strict: if the alert cannot be sent,
//! the pending row created for it is deleted again, so an approval
//! request never exists without a notification attempt behind it.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use quotedesk_core::approvals::{ApprovalGate, GateDecision};
use quotedesk_core::domain::approval::{ApprovalId, ApprovalRequest, ApprovalStatus};
use quotedesk_core::domain::quote::QuoteId;
use quotedesk_core::session::Session;
use quotedesk_telegram::ApprovalAlert;

use super::{bad_request, db_error, error_response, forbidden, not_found, resolve_session, unauthorized, ErrorResponse};
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct ApprovalRequestBody {
    #[serde(rename = "quoteId")]
    pub quote_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalOutcome {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<bool>,
    #[serde(rename = "retryAfterSeconds", skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<i64>,
}

impl ApprovalOutcome {
    fn approved() -> Self {
        Self { status: "approved", requested: None, retry_after_seconds: None }
    }

    fn throttled(retry_after_seconds: i64) -> Self {
        Self {
            status: "pending",
            requested: Some(false),
            retry_after_seconds: Some(retry_after_seconds),
        }
    }

    fn requested() -> Self {
        Self { status: "pending", requested: Some(true), retry_after_seconds: None }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub ids: Option<String>,
    #[serde(rename = "quoteId")]
    pub quote_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub status: String,
    pub requested_at: String,
}

#[derive(Debug, Serialize)]
pub struct StatusesResponse {
    pub statuses: HashMap<String, StatusEntry>,
}

/// Display name for the PIN's profile, falling back to a `PIN ####`
/// label when no profile row exists.
async fn requester_label(
    state: &ApiState,
    session: &Session,
) -> Result<Option<String>, ErrorResponse> {
    let profile = state.pins.find_by_pin(&session.pin).await.map_err(db_error)?;
    let name = profile.map(|profile| profile.display_name()).filter(|name| !name.is_empty());
    Ok(name.or_else(|| session.fallback_label()))
}

fn resolve_base_url(state: &ApiState, headers: &HeaderMap) -> String {
    let configured = state.base_url.as_deref().map(str::trim).filter(|base| !base.is_empty());
    let from_headers = || {
        headers
            .get("origin")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .or_else(|| {
                headers
                    .get("host")
                    .and_then(|value| value.to_str().ok())
                    .map(|host| format!("http://{host}"))
            })
    };

    let base = configured
        .map(str::to_string)
        .or_else(from_headers)
        .unwrap_or_else(|| "http://localhost".to_string());
    base.trim_end_matches('/').to_string()
}

pub async fn request_approval(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<ApprovalRequestBody>,
) -> Result<Json<ApprovalOutcome>, ErrorResponse> {
    let session = resolve_session(&headers);
    if !session.is_authenticated() {
        return Err(unauthorized());
    }

    let quote_id = body.quote_id.unwrap_or_default().trim().to_string();
    if quote_id.is_empty() {
        return Err(bad_request("Missing quoteId"));
    }
    let quote_id = QuoteId(quote_id);

    let quote = state
        .quotes
        .find_by_id(&quote_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("quote not found"))?;

    let latest = state.approvals.latest_for_quote(&quote_id).await.map_err(db_error)?;
    match ApprovalGate.evaluate(latest.as_ref(), Utc::now()) {
        GateDecision::AlreadyApproved => return Ok(Json(ApprovalOutcome::approved())),
        GateDecision::Throttled { retry_after_seconds } => {
            return Ok(Json(ApprovalOutcome::throttled(retry_after_seconds)))
        }
        GateDecision::OpenNew => {}
    }

    let requester = requester_label(&state, &session).await?;
    let approval = ApprovalRequest::open(
        ApprovalId(Uuid::new_v4().to_string()),
        quote_id.clone(),
        requester.clone(),
        Utc::now(),
    );
    state.approvals.save(approval.clone()).await.map_err(db_error)?;

    let approval_url = format!("{}/approve/{}", resolve_base_url(&state, &headers), quote_id.0);
    let alert = ApprovalAlert {
        quote_ref: quote.id.reference(),
        company_name: quote.company_name.clone(),
        system_name: quote.system_name.clone(),
        total: quote.total,
        requester_label: requester,
        approval_url,
    };

    let delivery = match state.notifier.send(&alert.to_message()).await {
        Ok(delivery) => delivery,
        Err(notify_error) => {
            // The pending row must not outlive a failed notification.
            if let Err(delete_error) = state.approvals.delete(&approval.id).await {
                error!(
                    approval_id = %approval.id.0,
                    error = %delete_error,
                    "rollback of unnotified approval request failed"
                );
            }
            warn!(quote_id = %quote_id.0, error = %notify_error, "approval alert dispatch failed");
            return Err(error_response(StatusCode::BAD_GATEWAY, notify_error.to_string()));
        }
    };

    // Correlation ids are nice-to-have; losing them must not fail the
    // request that already notified the approver.
    let chat_id = delivery.chat_id.parse::<i64>().ok();
    let message_id = (delivery.message_id != 0).then_some(delivery.message_id);
    if chat_id.is_some() || message_id.is_some() {
        if let Err(update_error) =
            state.approvals.set_telegram_refs(&approval.id, chat_id, message_id).await
        {
            warn!(
                approval_id = %approval.id.0,
                error = %update_error,
                "failed to persist telegram correlation ids"
            );
        }
    }

    info!(quote_id = %quote_id.0, approval_id = %approval.id.0, "approval requested");
    Ok(Json(ApprovalOutcome::requested()))
}

pub async fn statuses(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusesResponse>, ErrorResponse> {
    let session = resolve_session(&headers);
    if !session.is_authenticated() {
        return Err(unauthorized());
    }

    let raw_ids = query.ids.unwrap_or_default();
    let mut quote_ids: Vec<QuoteId> = raw_ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| QuoteId(id.to_string()))
        .collect();
    if quote_ids.is_empty() {
        if let Some(single) = query.quote_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) {
            quote_ids.push(QuoteId(single));
        }
    }
    if quote_ids.is_empty() {
        return Err(bad_request("Missing quoteIds"));
    }

    let latest = state.approvals.latest_for_quotes(&quote_ids).await.map_err(db_error)?;
    let statuses = latest
        .into_iter()
        .map(|approval| {
            (
                approval.quote_id.0,
                StatusEntry {
                    status: approval.status.as_str().to_string(),
                    requested_at: approval.requested_at.to_rfc3339(),
                },
            )
        })
        .collect();

    Ok(Json(StatusesResponse { statuses }))
}

pub async fn approve(
    State(state): State<ApiState>,
    Path(quote_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApprovalOutcome>, ErrorResponse> {
    let session = resolve_session(&headers);
    if !session.is_authenticated() {
        return Err(unauthorized());
    }
    if !session.is_admin() {
        return Err(forbidden());
    }

    let quote_id = QuoteId(quote_id);
    let mut latest = state
        .approvals
        .latest_for_quote(&quote_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("no approval request found"))?;

    if latest.status == ApprovalStatus::Approved {
        return Ok(Json(ApprovalOutcome::approved()));
    }

    // The approver label is the profile name only; unlike the request
    // side there is no PIN fallback.
    let approver = state
        .pins
        .find_by_pin(&session.pin)
        .await
        .map_err(db_error)?
        .map(|profile| profile.display_name())
        .filter(|name| !name.is_empty());

    latest.approve(approver, Utc::now());
    state.approvals.save(latest.clone()).await.map_err(db_error)?;

    info!(quote_id = %quote_id.0, approval_id = %latest.id.0, "quote approved");
    Ok(Json(ApprovalOutcome::approved()))
}
