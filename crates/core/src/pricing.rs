//! Quotation money math.
//!
//! Everything here is pure and total: inputs are clamped or dropped, never
//! rejected. Whether a draft has any usable line at all is checked one
//! layer up, at submission.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteItem;

/// VAT is a fixed 7%, applied to the discounted subtotal at presentation
/// time only. The rate is deliberately not configurable.
pub fn vat_rate() -> Decimal {
    Decimal::new(7, 2)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Totals extended with the presentation-only VAT pair. Never persisted;
/// recomputed identically wherever a quotation document is shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub vat: Decimal,
    pub grand_total: Decimal,
}

/// Trim descriptions, clamp qty and price to zero, and drop lines with an
/// empty description or non-positive quantity. Dropped lines are a silent
/// exclusion, not an error.
pub fn normalize_items(items: &[QuoteItem]) -> Vec<QuoteItem> {
    items
        .iter()
        .map(|item| QuoteItem {
            description: item.description.trim().to_string(),
            qty: item.qty.max(Decimal::ZERO),
            price: item.price.max(Decimal::ZERO),
        })
        .filter(|item| !item.description.is_empty() && item.qty > Decimal::ZERO)
        .collect()
}

pub fn subtotal(items: &[QuoteItem]) -> Decimal {
    normalize_items(items).iter().map(QuoteItem::amount).sum()
}

/// Submission-time totals: the requested discount is clamped into
/// `[0, subtotal]`, so `total` is non-negative by construction.
pub fn compute_totals(items: &[QuoteItem], requested_discount: Decimal) -> QuoteTotals {
    let subtotal = subtotal(items);
    let discount = requested_discount.max(Decimal::ZERO).min(subtotal);
    QuoteTotals { subtotal, discount, total: subtotal - discount }
}

/// Read-time inverse: only the discounted total is stored, so the discount
/// is recovered from the stored total against the recomputed subtotal.
pub fn derive_discount(subtotal: Decimal, stored_total: Decimal) -> Decimal {
    (subtotal - stored_total).max(Decimal::ZERO)
}

pub fn document_totals(items: &[QuoteItem], stored_total: Decimal) -> DocumentTotals {
    let subtotal = subtotal(items);
    let discount = derive_discount(subtotal, stored_total);
    let net = subtotal - discount;
    let vat = net * vat_rate();
    DocumentTotals { subtotal, discount, vat, grand_total: net + vat }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{compute_totals, derive_discount, document_totals, normalize_items};
    use crate::domain::quote::QuoteItem;

    fn item(description: &str, qty: i64, price: i64) -> QuoteItem {
        QuoteItem {
            description: description.to_string(),
            qty: Decimal::from(qty),
            price: Decimal::from(price),
        }
    }

    #[test]
    fn totals_follow_the_worked_example() {
        let items = vec![item("Access controller", 2, 100), item("Install labour", 1, 50)];
        let totals = compute_totals(&items, Decimal::from(30));

        assert_eq!(totals.subtotal, Decimal::from(250));
        assert_eq!(totals.discount, Decimal::from(30));
        assert_eq!(totals.total, Decimal::from(220));
    }

    #[test]
    fn discount_is_clamped_to_subtotal() {
        let items = vec![item("Sensor", 1, 100)];
        let totals = compute_totals(&items, Decimal::from(500));

        assert_eq!(totals.discount, Decimal::from(100));
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn negative_discount_is_treated_as_zero() {
        let items = vec![item("Sensor", 1, 100)];
        let totals = compute_totals(&items, Decimal::from(-25));

        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(100));
    }

    #[test]
    fn blank_and_zero_qty_items_are_dropped() {
        let items = vec![
            item("", 5, 10),
            item("   ", 2, 10),
            item("Camera", 0, 10),
            QuoteItem {
                description: "Cable".to_string(),
                qty: Decimal::from(-3),
                price: Decimal::from(10),
            },
        ];

        assert!(normalize_items(&items).is_empty());
        assert_eq!(compute_totals(&items, Decimal::ZERO).subtotal, Decimal::ZERO);
    }

    #[test]
    fn negative_price_is_clamped_not_dropped() {
        let items = vec![QuoteItem {
            description: "Rebate line".to_string(),
            qty: Decimal::from(2),
            price: Decimal::from(-40),
        }];
        let normalized = normalize_items(&items);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].price, Decimal::ZERO);
    }

    #[test]
    fn discount_back_derivation_never_goes_negative() {
        assert_eq!(derive_discount(Decimal::from(250), Decimal::from(220)), Decimal::from(30));
        // Stored total above the recomputed subtotal collapses to zero.
        assert_eq!(derive_discount(Decimal::from(100), Decimal::from(130)), Decimal::ZERO);
    }

    #[test]
    fn document_totals_apply_seven_percent_vat_to_the_net() {
        let items = vec![item("Access controller", 2, 100), item("Install labour", 1, 50)];
        let doc = document_totals(&items, Decimal::from(220));

        assert_eq!(doc.subtotal, Decimal::from(250));
        assert_eq!(doc.discount, Decimal::from(30));
        assert_eq!(doc.vat, Decimal::new(154, 1));
        assert_eq!(doc.grand_total, Decimal::new(2354, 1));
    }
}
