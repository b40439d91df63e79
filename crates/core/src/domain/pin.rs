use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinId(pub String);

pub const PIN_LENGTH: usize = 6;

/// Break-glass pins that carry admin authority even without a profile
/// row. Shared with the deployment's seed data.
pub const MASTER_PINS: [&str; 3] = ["000000", "111111", "222222"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Unknown role strings collapse to `User`, matching how role values
    /// stored before the role column existed are treated.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinProfile {
    pub id: PinId,
    pub pin: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub signature_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PinProfile {
    pub fn display_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn pin_is_well_formed(raw: &str) -> bool {
    raw.len() == PIN_LENGTH && raw.chars().all(|c| c.is_ascii_digit())
}

pub fn is_master_pin(pin: &str) -> bool {
    MASTER_PINS.contains(&pin)
}

/// Signature uploads must be inline image data URLs.
pub fn signature_image_is_valid(raw: &str) -> bool {
    raw.is_empty() || raw.starts_with("data:image/")
}
