use serde::{Deserialize, Serialize};

use crate::types::{Flash, UserId};

/// Client-held session state.
///
/// Serialized as JSON into a private (encrypted and authenticated) cookie.
/// Empty fields are omitted to keep the cookie small.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identity bound by login or by a remember token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UserId>,
    /// Counter page visits while anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits: Option<u64>,
    /// Whether the cookie outlives the browser session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub permanent: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl Session {
    /// A session with nothing worth persisting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uid.is_none() && self.visits.is_none() && self.flashes.is_empty()
    }

    pub(crate) fn decode(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }

    pub(crate) fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
