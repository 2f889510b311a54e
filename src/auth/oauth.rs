//! OAuth2 authorization code flow with a loopback redirect

use oauth2::{
    basic::{BasicClient, BasicRequestTokenError},
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    RedirectUrl, RefreshToken, Scope, TokenUrl,
};
use std::time::Duration;
use url::Url;

use super::callback::CallbackServer;
use super::{AuthError, ClientSecrets, TokenRecord};

/// How long to wait for the operator to complete consent
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the OAuth2 client from client secrets, optionally with a redirect URI
pub fn build_client(
    secrets: &ClientSecrets,
    redirect_uri: Option<String>,
) -> Result<BasicClient, AuthError> {
    let auth_url = AuthUrl::new(secrets.auth_uri.clone())
        .map_err(|e| AuthError::Config(format!("invalid auth_uri: {}", e)))?;
    let token_url = TokenUrl::new(secrets.token_uri.clone())
        .map_err(|e| AuthError::Config(format!("invalid token_uri: {}", e)))?;

    let mut client = BasicClient::new(
        ClientId::new(secrets.client_id.clone()),
        secrets.client_secret.clone().map(ClientSecret::new),
        auth_url,
        Some(token_url),
    )
    .set_auth_type(AuthType::RequestBody);

    if let Some(uri) = redirect_uri {
        let redirect = RedirectUrl::new(uri)
            .map_err(|e| AuthError::Config(format!("invalid redirect uri: {}", e)))?;
        client = client.set_redirect_uri(redirect);
    }

    Ok(client)
}

/// Runs the interactive authorization for one set of scopes.
pub struct Authorizer {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    state: Option<String>,
    port: u16,
    timeout: Duration,
}

impl Authorizer {
    pub fn new(secrets: ClientSecrets, scopes: &[&str]) -> Self {
        Self {
            secrets,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            state: None,
            port: 0,
            timeout: CALLBACK_TIMEOUT,
        }
    }

    /// Listen on a fixed loopback port instead of an ephemeral one.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use a fixed CSRF state instead of a random one.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bind the callback listener and build the authorization URL.
    pub async fn begin(self) -> Result<PendingAuthorization, AuthError> {
        let callback = CallbackServer::bind(self.port).await?;
        let client = build_client(&self.secrets, Some(callback.redirect_uri()))?;

        let state = self
            .state
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let csrf = state.clone();

        let (auth_url, _) = client
            .authorize_url(move || CsrfToken::new(csrf))
            .add_scopes(self.scopes.into_iter().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .url();

        Ok(PendingAuthorization {
            callback,
            client,
            auth_url,
            state,
            timeout: self.timeout,
        })
    }

    /// Full flow: print the URL, wait for consent, exchange the code.
    pub async fn authorize(self) -> Result<TokenRecord, AuthError> {
        let pending = self.begin().await?;

        eprintln!();
        eprintln!("Navigate to this URL to authorize:");
        eprintln!();
        eprintln!("{}", pending.auth_url());
        eprintln!();
        tracing::debug!(
            "Listening on port {} for {} (state {})",
            pending.port(),
            pending.redirect_uri(),
            pending.state()
        );
        tracing::info!("Waiting for authorization...");

        pending.complete().await
    }
}

/// Authorization in progress: listener bound, URL ready, no code yet.
pub struct PendingAuthorization {
    callback: CallbackServer,
    client: BasicClient,
    auth_url: Url,
    state: String,
    timeout: Duration,
}

impl PendingAuthorization {
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    pub fn redirect_uri(&self) -> String {
        self.callback.redirect_uri()
    }

    pub fn port(&self) -> u16 {
        self.callback.port()
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Wait for the callback and exchange its code for a token.
    pub async fn complete(self) -> Result<TokenRecord, AuthError> {
        let code = self
            .callback
            .wait_for_code(&self.state, self.timeout)
            .await?;

        tracing::info!("Exchanging authorization code for tokens...");
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| AuthError::Exchange(describe_token_error(&e)))?;

        Ok(TokenRecord::from_response(&response))
    }
}

/// Trade a refresh token for a new access token.
///
/// The provider usually omits the refresh token in the response, so the
/// previous one is carried over.
pub async fn refresh(client: &BasicClient, refresh_token: &str) -> Result<TokenRecord, AuthError> {
    let response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(|e| AuthError::Exchange(describe_token_error(&e)))?;

    let mut token = TokenRecord::from_response(&response);
    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh_token.to_string());
    }
    Ok(token)
}

fn describe_token_error<RE>(err: &BasicRequestTokenError<RE>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        oauth2::RequestTokenError::ServerResponse(resp) => resp.to_string(),
        oauth2::RequestTokenError::Request(e) => format!("request failed: {}", e),
        oauth2::RequestTokenError::Parse(e, _) => format!("unparseable response: {}", e),
        oauth2::RequestTokenError::Other(msg) => msg.clone(),
    }
}
