//! Authenticated HTTP client for the YouTube Data API
//!
//! Wraps reqwest with bearer token injection and `nextPageToken` pagination.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthorizedClient;
use crate::models::ListResponse;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Full read/write access to the account
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

/// Largest page the API hands out
const PAGE_SIZE: &str = "50";

pub struct YouTubeClient {
    auth: AuthorizedClient,
    base: String,
}

impl YouTubeClient {
    pub fn new(auth: AuthorizedClient) -> Self {
        Self {
            auth,
            base: YOUTUBE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base, resource)
    }

    /// GET `resource` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let token = self.auth.bearer().await?;
        let url = self.url(resource);
        tracing::debug!("GET {} {:?}", url, params);

        let resp = self
            .auth
            .http()
            .get(&url)
            .query(params)
            .bearer_auth(&token)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", resource))
    }

    /// PUT a JSON body to `resource` and decode the response.
    pub async fn put<B, T>(&self, resource: &str, params: &[(&str, &str)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.auth.bearer().await?;
        let url = self.url(resource);
        tracing::debug!("PUT {} {:?}", url, params);

        let resp = self
            .auth
            .http()
            .put(&url)
            .query(params)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", resource))
    }

    pub async fn delete(&self, resource: &str, params: &[(&str, &str)]) -> Result<()> {
        let token = self.auth.bearer().await?;
        let url = self.url(resource);
        tracing::debug!("DELETE {} {:?}", url, params);

        let resp = self
            .auth
            .http()
            .delete(&url)
            .query(params)
            .bearer_auth(&token)
            .send()
            .await
            .with_context(|| format!("DELETE {} failed", url))?;

        check_response(resp, &url).await?;
        Ok(())
    }

    /// Walk every page of a `list` call, handing each page's items to `f`.
    pub async fn for_each_page<T, F>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        mut f: F,
    ) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(Vec<T>) -> Result<()>,
    {
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, &str)> = params.to_vec();
            query.push(("maxResults", PAGE_SIZE));
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: ListResponse<T> = self.get(resource, &query).await?;
            f(page.items)?;

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(())
    }

    /// Collect every item of a `list` call.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        self.for_each_page(resource, params, |items: Vec<T>| {
            all.extend(items);
            Ok(())
        })
        .await?;
        Ok(all)
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!(
            "401 Unauthorized for {}. Token may be invalid -- run 'youtube logout' and retry.",
            url
        );
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("HTTP {} for {}: {}", status.as_u16(), url, body);
    }
    Ok(resp)
}
