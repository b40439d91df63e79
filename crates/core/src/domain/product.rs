use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Catalog entry with three price tiers. Quotation lines copy a price at
/// submission time, so editing a product never reprices existing quotes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub unit: String,
    pub dealer_price: Decimal,
    pub project_price: Decimal,
    pub user_price: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
