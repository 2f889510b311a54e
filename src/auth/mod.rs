//! Authentication for Google APIs
//!
//! Implements the OAuth2 authorization code flow with a loopback redirect,
//! caches the resulting token on disk per API, and hands out clients that
//! refresh their token on demand.

pub mod cache;
pub mod callback;
pub mod client;
pub mod oauth;
pub mod secrets;
pub mod tokens;

use anyhow::{Context, Result};
use std::time::Duration;

pub use cache::TokenCache;
pub use client::AuthorizedClient;
pub use oauth::{Authorizer, CALLBACK_TIMEOUT};
pub use secrets::ClientSecrets;
pub use tokens::TokenRecord;

/// Failures of the interactive authorization flow
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to listen on a local port: {0}")]
    Bind(#[source] std::io::Error),

    #[error("invalid OAuth client configuration: {0}")]
    Config(String),

    #[error("authorization state mismatch (received {received:?}), possible cross-site request forgery")]
    StateMismatch { received: String },

    #[error("authorization denied: {0}")]
    Denied(String),

    #[error("authorization callback carried no code")]
    MissingCode,

    #[error("timeout waiting for authorization after {0:?}")]
    Timeout(Duration),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("callback server stopped before authorization completed")]
    CallbackClosed,
}

/// Builds authenticated clients, reusing cached tokens when possible.
pub struct ClientFactory {
    secrets: ClientSecrets,
    cache: TokenCache,
    timeout: Duration,
    port: u16,
    state: Option<String>,
}

impl ClientFactory {
    pub fn new(secrets: ClientSecrets, cache: TokenCache) -> Self {
        Self {
            secrets,
            cache,
            timeout: CALLBACK_TIMEOUT,
            port: 0,
            state: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loopback port for the authorization redirect, 0 for any.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[cfg(test)]
    fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    fn authorizer(&self, scopes: &[&str]) -> Authorizer {
        let authorizer = Authorizer::new(self.secrets.clone(), scopes)
            .with_timeout(self.timeout)
            .with_port(self.port);
        match &self.state {
            Some(state) => authorizer.with_state(state.clone()),
            None => authorizer,
        }
    }

    /// Client for `api` authorized with `scopes`.
    ///
    /// A cached token is used as-is, without a network round trip. Otherwise
    /// the operator is walked through authorization and the new token is
    /// cached. A failed save is logged and the session continues.
    pub async fn new_client(&self, api: &str, scopes: &[&str]) -> Result<AuthorizedClient> {
        tracing::debug!("Token cache at {}", self.cache.dir().display());
        let token = match self.cache.load(api) {
            Ok(token) => {
                tracing::debug!("Using cached {} token", api);
                token
            }
            Err(e) => {
                tracing::warn!("Unable to reuse cached token: {:#}", e);
                let token = self
                    .authorizer(scopes)
                    .authorize()
                    .await
                    .with_context(|| format!("Authorization for '{}' failed", api))?;

                if let Err(e) = self.cache.save(api, &token) {
                    tracing::warn!("Unable to save token to cache: {:#}", e);
                }
                token
            }
        };

        Ok(AuthorizedClient::new(&self.secrets, token)?.with_cache(self.cache.clone(), api))
    }
}

/// Clear the cached token for `api`; the next command re-authorizes.
pub fn logout(cache: &TokenCache, api: &str) -> Result<()> {
    let removed = cache
        .remove(api)
        .with_context(|| format!("Unable to remove authentication token for '{}'", api))?;
    if removed {
        tracing::info!("Authentication token removed.");
    } else {
        tracing::info!("No cached token for '{}', nothing to remove.", api);
    }
    Ok(())
}

/// Describe the cached token for `api`.
pub fn status_report(cache: &TokenCache, api: &str) -> Vec<String> {
    let mut lines = vec![format!("Cache file:  {}", cache.path_for(api).display())];

    let token = match cache.load(api) {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!("No usable cached token: {:#}", e);
            lines.push("Token:       none".to_string());
            lines.push(String::new());
            lines.push("Run any command to authorize.".to_string());
            return lines;
        }
    };

    let validity = if token.is_expired() { "expired" } else { "valid" };
    lines.push(format!("Token:       {} ({})", validity, token.token_type));
    match token.expires_at.and_then(|exp| chrono::DateTime::<chrono::Utc>::from_timestamp(exp as i64, 0)) {
        Some(at) => lines.push(format!("  expires_at: {}", at.to_rfc3339())),
        None => lines.push("  expires_at: unknown".to_string()),
    }
    match token.refresh_token {
        Some(_) => lines.push("Refresh tok: present".to_string()),
        None => lines.push("Refresh tok: none".to_string()),
    }
    lines
}
