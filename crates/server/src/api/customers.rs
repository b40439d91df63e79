use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quotedesk_core::domain::customer::{normalize_tax_id, tax_id_is_valid, Customer, CustomerId, TAX_ID_LENGTH};

use super::{bad_request, db_error, ErrorResponse};
use crate::state::ApiState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerEntry {
    pub id: String,
    pub company_name: String,
    pub tax_id: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub address: String,
    pub approx_purchase_date: String,
    pub created_at: String,
}

impl From<Customer> for CustomerEntry {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.0,
            company_name: customer.company_name,
            tax_id: customer.tax_id,
            contact_name: customer.contact_name,
            contact_phone: customer.contact_phone,
            address: customer.address,
            approx_purchase_date: customer.approx_purchase_date,
            created_at: customer.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub approx_purchase_date: Option<String>,
}

pub async fn list(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CustomerEntry>>, ErrorResponse> {
    let customers = state.customers.list().await.map_err(db_error)?;
    Ok(Json(customers.into_iter().map(CustomerEntry::from).collect()))
}

pub async fn create(
    State(state): State<ApiState>,
    Json(draft): Json<CustomerDraft>,
) -> Result<(StatusCode, Json<CustomerEntry>), ErrorResponse> {
    let company_name = draft.company_name.unwrap_or_default().trim().to_string();
    if company_name.is_empty() {
        return Err(bad_request("company name is required"));
    }

    let tax_id = normalize_tax_id(&draft.tax_id.unwrap_or_default());
    if !tax_id_is_valid(&tax_id) {
        return Err(bad_request(format!("tax id must be exactly {TAX_ID_LENGTH} digits")));
    }

    let customer = Customer {
        id: CustomerId(Uuid::new_v4().to_string()),
        company_name,
        tax_id,
        contact_name: draft.contact_name.unwrap_or_default().trim().to_string(),
        contact_phone: draft.contact_phone.unwrap_or_default().trim().to_string(),
        address: draft.address.unwrap_or_default().trim().to_string(),
        approx_purchase_date: draft.approx_purchase_date.unwrap_or_default().trim().to_string(),
        created_at: Utc::now(),
    };

    state.customers.insert(customer.clone()).await.map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(CustomerEntry::from(customer))))
}
