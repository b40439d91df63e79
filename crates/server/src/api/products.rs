use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quotedesk_core::domain::product::{Product, ProductId};

use super::{bad_request, db_error, not_found, ErrorResponse};
use crate::state::ApiState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub unit: String,
    pub dealer_price: f64,
    pub project_price: f64,
    pub user_price: f64,
    pub description: String,
}

impl From<Product> for ProductEntry {
    fn from(product: Product) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        Self {
            id: product.id.0,
            name: product.name,
            sku: product.sku,
            unit: product.unit,
            dealer_price: product.dealer_price.to_f64().unwrap_or(0.0),
            project_price: product.project_price.to_f64().unwrap_or(0.0),
            user_price: product.user_price.to_f64().unwrap_or(0.0),
            description: product.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit: Option<String>,
    pub dealer_price: Option<f64>,
    pub project_price: Option<f64>,
    pub user_price: Option<f64>,
    /// Legacy single-price field from before the tiers existed; used as
    /// the fallback for any missing tier.
    pub unit_price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn clamp_price(value: Option<f64>, fallback: Option<f64>) -> Decimal {
    let raw = value.or(fallback).unwrap_or(0.0);
    if raw < 0.0 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(raw).unwrap_or_default()
}

struct ValidatedDraft {
    name: String,
    sku: String,
    unit: String,
    dealer_price: Decimal,
    project_price: Decimal,
    user_price: Decimal,
    description: String,
}

fn validate_draft(draft: ProductDraft) -> Result<ValidatedDraft, ErrorResponse> {
    let name = draft.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(bad_request("product name is required"));
    }

    Ok(ValidatedDraft {
        name,
        sku: draft.sku.unwrap_or_default().trim().to_string(),
        unit: draft.unit.unwrap_or_default().trim().to_string(),
        dealer_price: clamp_price(draft.dealer_price, draft.unit_price),
        project_price: clamp_price(draft.project_price, draft.unit_price),
        user_price: clamp_price(draft.user_price, draft.unit_price),
        description: draft.description.unwrap_or_default().trim().to_string(),
    })
}

pub async fn list(State(state): State<ApiState>) -> Result<Json<Vec<ProductEntry>>, ErrorResponse> {
    let products = state.products.list().await.map_err(db_error)?;
    Ok(Json(products.into_iter().map(ProductEntry::from).collect()))
}

pub async fn create(
    State(state): State<ApiState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ProductEntry>), ErrorResponse> {
    let draft = validate_draft(draft)?;

    let product = Product {
        id: ProductId(Uuid::new_v4().to_string()),
        name: draft.name,
        sku: draft.sku,
        unit: draft.unit,
        dealer_price: draft.dealer_price,
        project_price: draft.project_price,
        user_price: draft.user_price,
        description: draft.description,
        created_at: Utc::now(),
    };

    state.products.insert(product.clone()).await.map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(ProductEntry::from(product))))
}

pub async fn update(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<ProductEntry>, ErrorResponse> {
    let draft = validate_draft(draft)?;

    let product = Product {
        id: ProductId(id),
        name: draft.name,
        sku: draft.sku,
        unit: draft.unit,
        dealer_price: draft.dealer_price,
        project_price: draft.project_price,
        user_price: draft.user_price,
        description: draft.description,
        created_at: Utc::now(),
    };

    let stored = state
        .products
        .update(product)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("product not found"))?;

    Ok(Json(ProductEntry::from(stored)))
}

pub async fn remove(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ErrorResponse> {
    let removed = state.products.delete(&ProductId(id)).await.map_err(db_error)?;
    if !removed {
        return Err(not_found("product not found"));
    }

    Ok(Json(OkResponse { ok: true }))
}
