use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    // Present in the schema for forward compatibility; no request path
    // produces it today.
    Rejected,
}

impl ApprovalStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// One attempt to get sign-off on a quotation. Rows are append-only: a
/// re-request after the cooldown inserts a fresh row and the old one is
/// kept as history. Only the latest row per quote is authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: ApprovalId,
    pub quote_id: QuoteId,
    pub status: ApprovalStatus,
    pub requested_by: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub telegram_chat_id: Option<i64>,
    pub telegram_message_id: Option<i64>,
}

impl ApprovalRequest {
    pub fn open(
        id: ApprovalId,
        quote_id: QuoteId,
        requested_by: Option<String>,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            quote_id,
            status: ApprovalStatus::Pending,
            requested_by,
            requested_at,
            approved_by: None,
            approved_at: None,
            telegram_chat_id: None,
            telegram_message_id: None,
        }
    }

    /// Terminal transition. Approving an already-approved request is a
    /// no-op so the operation stays idempotent; `true` means the row was
    /// actually mutated.
    pub fn approve(&mut self, approved_by: Option<String>, now: DateTime<Utc>) -> bool {
        if self.status == ApprovalStatus::Approved {
            return false;
        }
        self.status = ApprovalStatus::Approved;
        self.approved_by = approved_by;
        self.approved_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{ApprovalId, ApprovalRequest, ApprovalStatus};
    use crate::domain::quote::QuoteId;

    fn pending() -> ApprovalRequest {
        ApprovalRequest::open(
            ApprovalId("apr-1".to_string()),
            QuoteId("q-1".to_string()),
            Some("PIN 482913".to_string()),
            Utc::now(),
        )
    }

    #[test]
    fn approve_mutates_once() {
        let mut request = pending();
        let now = Utc::now();

        assert!(request.approve(Some("Somsri W.".to_string()), now));
        assert_eq!(request.status, ApprovalStatus::Approved);
        assert_eq!(request.approved_at, Some(now));

        let later = now + chrono::Duration::minutes(5);
        assert!(!request.approve(Some("Someone Else".to_string()), later));
        assert_eq!(request.approved_by.as_deref(), Some("Somsri W."));
        assert_eq!(request.approved_at, Some(now));
    }

    #[test]
    fn unknown_status_strings_parse_as_pending() {
        assert_eq!(ApprovalStatus::parse("APPROVED"), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::parse("queued"), ApprovalStatus::Pending);
    }
}
