//! Gate for "request approval for quotation X".
//!
//! Approval attempts are an append-only log: re-requesting never mutates
//! an existing row, it opens a fresh one. The gate looks only at the
//! latest row for the quotation and decides whether a new request may be
//! opened now.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::approval::{ApprovalRequest, ApprovalStatus};

/// Minimum wait between two pending requests for the same quotation.
/// A UX throttle, not a correctness guarantee: concurrent requests can
/// still race past it (see the concurrency notes in DESIGN.md).
pub const APPROVAL_COOLDOWN_SECS: i64 = 600;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateDecision {
    /// The latest request was already approved; report that, touch nothing.
    AlreadyApproved,
    /// A pending request is still inside the cooldown window.
    Throttled { retry_after_seconds: i64 },
    /// No blocking request exists; open a new pending row and notify.
    OpenNew,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ApprovalGate;

impl ApprovalGate {
    pub fn evaluate(&self, latest: Option<&ApprovalRequest>, now: DateTime<Utc>) -> GateDecision {
        let Some(latest) = latest else {
            return GateDecision::OpenNew;
        };

        match latest.status {
            ApprovalStatus::Approved => GateDecision::AlreadyApproved,
            // A rejected head behaves like an empty history: nothing
            // blocks a fresh request.
            ApprovalStatus::Rejected => GateDecision::OpenNew,
            ApprovalStatus::Pending => {
                let elapsed = now - latest.requested_at;
                let remaining = Duration::seconds(APPROVAL_COOLDOWN_SECS) - elapsed;
                if remaining > Duration::zero() {
                    GateDecision::Throttled { retry_after_seconds: ceil_seconds(remaining) }
                } else {
                    GateDecision::OpenNew
                }
            }
        }
    }
}

fn ceil_seconds(duration: Duration) -> i64 {
    let millis = duration.num_milliseconds();
    millis / 1000 + i64::from(millis % 1000 != 0)
}
