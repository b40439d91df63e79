use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quotedesk_core::domain::customer::CustomerId;
use quotedesk_core::domain::quote::{Quote, QuoteId, QuoteItem};
use quotedesk_core::pricing;

use super::{bad_request, db_error, not_found, ErrorResponse};
use crate::state::ApiState;

const RECENT_QUOTE_LIMIT: u32 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct ItemDraft {
    pub description: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub customer_id: Option<String>,
    pub company_name: Option<String>,
    pub system_name: Option<String>,
    pub items: Option<Vec<ItemDraft>>,
    pub discount: Option<f64>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ItemEntry {
    pub description: String,
    pub qty: f64,
    pub price: f64,
}

impl From<&QuoteItem> for ItemEntry {
    fn from(item: &QuoteItem) -> Self {
        Self {
            description: item.description.clone(),
            qty: item.qty.to_f64().unwrap_or(0.0),
            price: item.price.to_f64().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEntry {
    pub id: String,
    pub customer_id: Option<String>,
    pub company_name: String,
    pub system_name: String,
    pub items: Vec<ItemEntry>,
    pub total: f64,
    /// Back-derived from the stored total; never persisted.
    pub discount: f64,
    pub note: Option<String>,
    pub created_at: String,
}

impl From<&Quote> for QuoteEntry {
    fn from(quote: &Quote) -> Self {
        let subtotal = pricing::subtotal(&quote.items);
        let discount = pricing::derive_discount(subtotal, quote.total);

        Self {
            id: quote.id.0.clone(),
            customer_id: quote.customer_id.as_ref().map(|id| id.0.clone()),
            company_name: quote.company_name.clone(),
            system_name: quote.system_name.clone(),
            items: quote.items.iter().map(ItemEntry::from).collect(),
            total: quote.total.to_f64().unwrap_or(0.0),
            discount: discount.to_f64().unwrap_or(0.0),
            note: quote.note.clone(),
            created_at: quote.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotalsEntry {
    pub subtotal: f64,
    pub discount: f64,
    pub vat: f64,
    pub grand_total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    #[serde(flatten)]
    pub quote: QuoteEntry,
    pub quote_ref: String,
    pub totals: DocumentTotalsEntry,
}

fn draft_items(drafts: Vec<ItemDraft>) -> Vec<QuoteItem> {
    drafts
        .into_iter()
        .map(|draft| QuoteItem {
            description: draft.description.unwrap_or_default(),
            qty: Decimal::from_f64(draft.qty.unwrap_or(0.0)).unwrap_or_default(),
            price: Decimal::from_f64(draft.price.unwrap_or(0.0)).unwrap_or_default(),
        })
        .collect()
}

pub async fn create(
    State(state): State<ApiState>,
    Json(draft): Json<QuoteDraft>,
) -> Result<Json<CreatedResponse>, ErrorResponse> {
    let company_name = draft.company_name.unwrap_or_default().trim().to_string();
    if company_name.is_empty() {
        return Err(bad_request("select a customer before submitting"));
    }

    let items = pricing::normalize_items(&draft_items(draft.items.unwrap_or_default()));
    if items.is_empty() {
        return Err(bad_request("add at least one line item"));
    }

    let discount = Decimal::from_f64(draft.discount.unwrap_or(0.0)).unwrap_or_default();
    let totals = pricing::compute_totals(&items, discount);

    let system_name = draft.system_name.unwrap_or_default().trim().to_string();
    let quote = Quote {
        id: QuoteId(Uuid::new_v4().to_string()),
        customer_id: draft
            .customer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(CustomerId),
        system_name: if system_name.is_empty() { company_name.clone() } else { system_name },
        company_name,
        items,
        total: totals.total,
        note: draft.note.map(|note| note.trim().to_string()).filter(|note| !note.is_empty()),
        created_at: Utc::now(),
    };

    state.quotes.insert(quote.clone()).await.map_err(db_error)?;

    Ok(Json(CreatedResponse { id: quote.id.0 }))
}

pub async fn list(State(state): State<ApiState>) -> Result<Json<Vec<QuoteEntry>>, ErrorResponse> {
    let quotes = state.quotes.list_recent(RECENT_QUOTE_LIMIT).await.map_err(db_error)?;
    Ok(Json(quotes.iter().map(QuoteEntry::from).collect()))
}

/// Document view: the stored quote plus the presentation-only VAT pair.
/// The HTML approval page renders from the same `document_totals` call,
/// so the two can never disagree.
pub async fn document(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<QuoteDocument>, ErrorResponse> {
    let quote = state
        .quotes
        .find_by_id(&QuoteId(id))
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("quote not found"))?;

    let totals = pricing::document_totals(&quote.items, quote.total);

    Ok(Json(QuoteDocument {
        quote_ref: quote.id.reference(),
        quote: QuoteEntry::from(&quote),
        totals: DocumentTotalsEntry {
            subtotal: totals.subtotal.to_f64().unwrap_or(0.0),
            discount: totals.discount.to_f64().unwrap_or(0.0),
            vat: totals.vat.to_f64().unwrap_or(0.0),
            grand_total: totals.grand_total.to_f64().unwrap_or(0.0),
        },
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        Json,
    };
    use rust_decimal::Decimal;

    use quotedesk_core::domain::quote::QuoteId;
    use quotedesk_db::repositories::QuoteRepository;

    use super::{create, document, list, ItemDraft, QuoteDraft};
    use crate::api::test_support::harness;

    fn draft() -> QuoteDraft {
        QuoteDraft {
            customer_id: None,
            company_name: Some("Riverside Hotel".to_string()),
            system_name: Some("Access control".to_string()),
            items: Some(vec![
                ItemDraft {
                    description: Some("Controller".to_string()),
                    qty: Some(2.0),
                    price: Some(100.0),
                },
                ItemDraft {
                    description: Some("Labour".to_string()),
                    qty: Some(1.0),
                    price: Some(50.0),
                },
                // Dropped by normalization: no description.
                ItemDraft { description: None, qty: Some(9.0), price: Some(99.0) },
            ]),
            discount: Some(30.0),
            note: None,
        }
    }

    #[tokio::test]
    async fn create_stores_the_discounted_total_and_filtered_items() {
        let harness = harness();

        let Json(created) =
            create(State(harness.state), Json(draft())).await.expect("create should succeed");

        let stored = harness
            .quotes
            .find_by_id(&QuoteId(created.id))
            .await
            .expect("lookup")
            .expect("quote stored");
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.total, Decimal::from(220));
    }

    #[tokio::test]
    async fn create_without_surviving_items_is_rejected() {
        let harness = harness();

        let error = create(
            State(harness.state),
            Json(QuoteDraft {
                company_name: Some("Riverside Hotel".to_string()),
                items: Some(vec![ItemDraft {
                    description: Some("".to_string()),
                    qty: Some(5.0),
                    price: Some(10.0),
                }]),
                ..QuoteDraft::default()
            }),
        )
        .await
        .expect_err("should fail");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn system_name_defaults_to_the_company_name() {
        let harness = harness();

        let Json(created) = create(
            State(harness.state),
            Json(QuoteDraft { system_name: None, ..draft() }),
        )
        .await
        .expect("create should succeed");

        let stored = harness
            .quotes
            .find_by_id(&QuoteId(created.id))
            .await
            .expect("lookup")
            .expect("quote stored");
        assert_eq!(stored.system_name, "Riverside Hotel");
    }

    #[tokio::test]
    async fn list_back_derives_the_discount() {
        let harness = harness();
        create(State(harness.state.clone()), Json(draft())).await.expect("create");

        let Json(quotes) = list(State(harness.state)).await.expect("list");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].total, 220.0);
        assert_eq!(quotes[0].discount, 30.0);
    }

    #[tokio::test]
    async fn document_applies_the_vat_formula() {
        let harness = harness();
        let Json(created) =
            create(State(harness.state.clone()), Json(draft())).await.expect("create");

        let Json(doc) = document(State(harness.state), Path(created.id))
            .await
            .expect("document should resolve");

        assert_eq!(doc.totals.subtotal, 250.0);
        assert_eq!(doc.totals.discount, 30.0);
        assert_eq!(doc.totals.vat, 15.4);
        assert_eq!(doc.totals.grand_total, 235.4);
    }

    #[tokio::test]
    async fn document_for_unknown_quote_is_not_found() {
        let harness = harness();

        let error = document(State(harness.state), Path("missing".to_string()))
            .await
            .expect_err("should 404");
        assert_eq!(error.0, StatusCode::NOT_FOUND);
    }
}
