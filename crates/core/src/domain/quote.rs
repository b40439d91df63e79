use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl QuoteId {
    /// Short human-facing reference: the digits of the id, or the id
    /// itself when it contains none.
    pub fn reference(&self) -> String {
        let digits: String = self.0.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            self.0.clone()
        } else {
            digits
        }
    }
}

/// One quotation line, snapshotted at submission time. Items are stored
/// verbatim on the quote; later catalog changes never touch them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub description: String,
    pub qty: Decimal,
    pub price: Decimal,
}

impl QuoteItem {
    pub fn amount(&self) -> Decimal {
        self.qty * self.price
    }
}

/// A saved price proposal. Insert-only: quotes are never edited or
/// deleted once submitted. The stored `total` already has the submission
/// discount applied; the discount itself is back-derived at read time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub customer_id: Option<CustomerId>,
    pub company_name: String,
    pub system_name: String,
    pub items: Vec<QuoteItem>,
    pub total: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::QuoteId;

    #[test]
    fn reference_keeps_only_digits() {
        let id = QuoteId("3f2a-1909-bc".to_string());
        assert_eq!(id.reference(), "321909");
    }

    #[test]
    fn reference_falls_back_to_raw_id() {
        let id = QuoteId("draft".to_string());
        assert_eq!(id.reference(), "draft");
    }
}
