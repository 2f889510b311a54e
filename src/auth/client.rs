//! Token-carrying HTTP client with lazy refresh

use anyhow::{bail, Context, Result};
use oauth2::basic::BasicClient;
use tokio::sync::Mutex;

use super::oauth::{build_client, refresh};
use super::{ClientSecrets, TokenCache, TokenRecord};

/// Where a refreshed token gets written back to
struct CacheSlot {
    cache: TokenCache,
    api: String,
}

/// Authenticated client handed to API commands.
///
/// Holds the current token and refreshes it with the refresh token when it
/// expires. Nothing touches the network until a request needs a token.
pub struct AuthorizedClient {
    http: reqwest::Client,
    oauth: BasicClient,
    token: Mutex<TokenRecord>,
    cache: Option<CacheSlot>,
}

impl AuthorizedClient {
    pub fn new(secrets: &ClientSecrets, token: TokenRecord) -> Result<Self> {
        let oauth = build_client(secrets, None)?;
        Ok(Self {
            http: reqwest::Client::new(),
            oauth,
            token: Mutex::new(token),
            cache: None,
        })
    }

    /// Persist refreshed tokens under `api` in `cache`.
    pub fn with_cache(mut self, cache: TokenCache, api: impl Into<String>) -> Self {
        self.cache = Some(CacheSlot {
            cache,
            api: api.into(),
        });
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Current token, refreshing it first if it has expired.
    pub async fn token(&self) -> Result<TokenRecord> {
        let mut token = self.token.lock().await;
        if !token.is_expired() {
            return Ok(token.clone());
        }

        let Some(refresh_token) = token.refresh_token.clone() else {
            bail!("Access token expired and no refresh token. Run 'youtube logout' and retry.");
        };

        tracing::info!("Access token expired, refreshing...");
        let refreshed = refresh(&self.oauth, &refresh_token)
            .await
            .context("Token refresh failed")?;

        if let Some(slot) = &self.cache {
            if let Err(e) = slot.cache.save(&slot.api, &refreshed) {
                tracing::warn!("Unable to save refreshed token: {:#}", e);
            }
        }

        *token = refreshed.clone();
        tracing::info!("Token refreshed");
        Ok(refreshed)
    }

    /// Access token string for an `Authorization: Bearer` header.
    pub async fn bearer(&self) -> Result<String> {
        Ok(self.token().await?.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secrets_for(server: &MockServer) -> ClientSecrets {
        ClientSecrets {
            token_uri: format!("{}/token", server.uri()),
            ..ClientSecrets::new("client-id", Some("secret".to_string()))
        }
    }

    #[tokio::test]
    async fn test_valid_token_used_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            AuthorizedClient::new(&secrets_for(&server), TokenRecord::new("A".into(), Some(3600)))
                .unwrap();
        assert_eq!(client.bearer().await.unwrap(), "A");
    }

    #[tokio::test]
    async fn test_expired_token_refreshed_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "A2",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path());
        let expired = TokenRecord {
            access_token: "A".into(),
            refresh_token: Some("R".into()),
            expires_at: Some(0),
            token_type: "Bearer".into(),
        };

        let client = AuthorizedClient::new(&secrets_for(&server), expired)
            .unwrap()
            .with_cache(cache.clone(), "youtube");

        assert_eq!(client.bearer().await.unwrap(), "A2");
        // Second call reuses the refreshed token
        assert_eq!(client.bearer().await.unwrap(), "A2");

        let cached = cache.load("youtube").unwrap();
        assert_eq!(cached.access_token, "A2");
        assert_eq!(cached.refresh_token.as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_fails() {
        let server = MockServer::start().await;
        let expired = TokenRecord {
            expires_at: Some(0),
            ..TokenRecord::new("A".into(), None)
        };
        let client = AuthorizedClient::new(&secrets_for(&server), expired).unwrap();

        let err = client.bearer().await.unwrap_err();
        assert!(err.to_string().contains("no refresh token"));
    }
}
