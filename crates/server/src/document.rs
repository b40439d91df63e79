//! Server-rendered quotation document, reached from the Telegram deep
//! link. Totals come from the same `document_totals` call as the JSON
//! document endpoint, so the page can never disagree with it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use tera::{Context, Tera};
use tracing::warn;

use quotedesk_core::domain::quote::QuoteId;
use quotedesk_core::{format, pricing};
use quotedesk_db::repositories::QuoteRepository;

#[derive(Clone)]
pub struct DocumentState {
    quotes: Arc<dyn QuoteRepository>,
    templates: Arc<Tera>,
}

fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/document/**/*") {
        Ok(tera) => tera,
        Err(error) => {
            warn!(error = %error, "failed to load document templates from filesystem, using embedded fallback");
            Tera::default()
        }
    };

    tera.add_raw_template(
        "approval.html",
        include_str!("../../../templates/document/approval.html"),
    )
    .ok();

    Arc::new(tera)
}

pub fn router(quotes: Arc<dyn QuoteRepository>) -> Router {
    Router::new()
        .route("/approve/{quote_id}", get(approval_page))
        .with_state(DocumentState { quotes, templates: init_templates() })
}

pub async fn approval_page(
    Path(quote_id): Path<String>,
    State(state): State<DocumentState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let quote = state
        .quotes
        .find_by_id(&QuoteId(quote_id))
        .await
        .map_err(|error| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<h1>Database Error</h1><p>{error}</p>")),
            )
        })?
        .ok_or_else(|| (StatusCode::NOT_FOUND, Html("<h1>Quote not found</h1>".to_string())))?;

    // Filtered-out lines never appear on the document.
    let items = pricing::normalize_items(&quote.items);
    let totals = pricing::document_totals(&quote.items, quote.total);

    let item_rows: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            serde_json::json!({
                "description": item.description,
                "qty": item.qty.normalize().to_string(),
                "price": format::baht_plain(item.price),
                "amount": format::baht_plain(item.amount()),
            })
        })
        .collect();

    let mut context = Context::new();
    context.insert(
        "quote",
        &serde_json::json!({
            "ref": quote.id.reference(),
            "company_name": quote.company_name,
            "system_name": quote.system_name,
            "note": quote.note,
            "created_at": quote.created_at.format("%d/%m/%Y").to_string(),
        }),
    );
    context.insert("items", &item_rows);
    context.insert(
        "totals",
        &serde_json::json!({
            "subtotal": format::baht_plain(totals.subtotal),
            "discount": format::baht_plain(totals.discount),
            "vat": format::baht_plain(totals.vat),
            "grand_total": format::baht_plain(totals.grand_total),
        }),
    );

    state.templates.render("approval.html", &context).map(Html).map_err(|error| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Template Error</h1><p>{error}</p>")),
        )
    })
}
