//! Request identity, resolved once at the HTTP boundary.
//!
//! The PIN and role travel in two cookies. They are parsed into a
//! `Session` before any handler logic runs, so authorization checks never
//! reach back into ambient request state.

use serde::{Deserialize, Serialize};

use crate::domain::pin::{is_master_pin, Role};

pub const PIN_COOKIE: &str = "pin_auth";
pub const ROLE_COOKIE: &str = "pin_role";

/// Historical cookie value from before PIN profiles existed; treated as
/// unauthenticated, never as a usable PIN.
const PLACEHOLDER_PIN: &str = "ok";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub pin: String,
    pub role: Role,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { pin: String::new(), role: Role::User }
    }

    pub fn from_cookies(pin: Option<&str>, role: Option<&str>) -> Self {
        Self {
            pin: pin.unwrap_or_default().trim().to_string(),
            role: Role::parse(role.unwrap_or_default()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.pin.is_empty() && self.pin != PLACEHOLDER_PIN
    }

    /// Admin authority comes from the role cookie or from a master PIN.
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && (self.role == Role::Admin || is_master_pin(&self.pin))
    }

    /// Label used for an approval request when the PIN has no profile row.
    pub fn fallback_label(&self) -> Option<String> {
        if self.is_authenticated() {
            Some(format!("PIN {}", self.pin))
        } else {
            None
        }
    }
}
