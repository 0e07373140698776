use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a registered identity.
///
/// This is the only identity reference stored in session and remember-token
/// cookies; logins and display names are resolved through the
/// [`UserDirectory`](crate::directory::UserDirectory).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub u32);

/// Severity of a flash notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// One-shot user-visible notice, queued in the session and shown by the
/// next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
