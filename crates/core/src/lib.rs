pub mod approvals;
pub mod config;
pub mod domain;
pub mod format;
pub mod pricing;
pub mod session;

pub use approvals::{ApprovalGate, GateDecision, APPROVAL_COOLDOWN_SECS};
pub use domain::approval::{ApprovalId, ApprovalRequest, ApprovalStatus};
pub use domain::customer::{Customer, CustomerId};
pub use domain::pin::{PinId, PinProfile, Role, MASTER_PINS, PIN_LENGTH};
pub use domain::product::{Product, ProductId};
pub use domain::quote::{Quote, QuoteId, QuoteItem};
pub use pricing::{compute_totals, derive_discount, document_totals, DocumentTotals, QuoteTotals};
pub use session::Session;
