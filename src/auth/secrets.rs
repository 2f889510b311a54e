//! Google OAuth client secrets (the JSON downloaded from the API console)

use serde::Deserialize;
use std::path::Path;

use super::AuthError;

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Console downloads wrap the credentials in an `installed` or `web` key.
#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    #[cfg(test)]
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
        }
    }

    pub fn from_json(data: &str) -> Result<Self, AuthError> {
        let file: SecretsFile = serde_json::from_str(data)
            .map_err(|e| AuthError::Config(format!("malformed client secrets: {}", e)))?;

        let secrets = file.installed.or(file.web).ok_or_else(|| {
            AuthError::Config("client secrets have no 'installed' or 'web' section".to_string())
        })?;

        if secrets.client_id.is_empty() {
            return Err(AuthError::Config("client_id is empty".to_string()));
        }
        Ok(secrets)
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            AuthError::Config(format!(
                "failed to read client secrets {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&data)
    }
}
