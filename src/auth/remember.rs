use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::UserId;

/// Payload of the remember-me cookie.
///
/// Integrity comes from the private cookie jar; the expiry is checked here
/// so a replayed cookie stops working even if the browser keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RememberToken {
    pub(crate) uid: UserId,
    /// Expiry as unix seconds.
    pub(crate) exp: i64,
}

impl RememberToken {
    pub(crate) fn issue(uid: UserId, ttl_days: i64, now: OffsetDateTime) -> Self {
        Self {
            uid,
            exp: (now + Duration::days(ttl_days)).unix_timestamp(),
        }
    }

    pub(crate) fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() < self.exp
    }

    pub(crate) fn decode(value: &str) -> Option<Self> {
        serde_json::from_str(value).ok()
    }

    pub(crate) fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
