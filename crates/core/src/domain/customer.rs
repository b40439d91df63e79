use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub company_name: String,
    pub tax_id: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub address: String,
    pub approx_purchase_date: String,
    pub created_at: DateTime<Utc>,
}

/// Thai tax ids are 13 digits. Input is normalized to digits before this
/// check, and an empty value is allowed (the field is optional).
pub const TAX_ID_LENGTH: usize = 13;

pub fn normalize_tax_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn tax_id_is_valid(normalized: &str) -> bool {
    normalized.is_empty() || normalized.len() == TAX_ID_LENGTH
}

#[cfg(test)]
mod tests {
    use super::{normalize_tax_id, tax_id_is_valid};

    #[test]
    fn normalization_strips_non_digits() {
        assert_eq!(normalize_tax_id("0-1055-43102-21-4"), "0105543102214");
    }

    #[test]
    fn empty_and_thirteen_digit_values_are_valid() {
        assert!(tax_id_is_valid(""));
        assert!(tax_id_is_valid("0105543102214"));
        assert!(!tax_id_is_valid("12345"));
    }
}
