//! Token record persisted between invocations

use oauth2::basic::{BasicTokenResponse, BasicTokenType};
use oauth2::TokenResponse;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access/refresh token pair plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as Unix timestamp (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TokenRecord {
    pub fn new(access_token: String, expires_in_secs: Option<u64>) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: expires_in_secs.map(|secs| now_secs() + secs),
            token_type: default_token_type(),
        }
    }

    /// Build a record from a token endpoint response.
    ///
    /// Providers omit `refresh_token` on refresh grants; callers carry the
    /// previous one over in that case.
    pub fn from_response(response: &BasicTokenResponse) -> Self {
        let token_type = match response.token_type() {
            BasicTokenType::Bearer => "Bearer".to_string(),
            BasicTokenType::Mac => "MAC".to_string(),
            BasicTokenType::Extension(other) => other.clone(),
        };

        Self {
            refresh_token: response.refresh_token().map(|rt| rt.secret().to_string()),
            token_type,
            ..Self::new(
                response.access_token().secret().to_string(),
                response.expires_in().map(|d| d.as_secs()),
            )
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            // Treat tokens within a minute of expiry as expired
            Some(exp) => now_secs() + 60 >= exp,
            None => false,
        }
    }
}
