//! Video metadata editing

use anyhow::{bail, Context, Result};

use super::client::YouTubeClient;
use crate::models::{ListResponse, Video};

/// Requested changes; `None` or empty fields are left as they are.
#[derive(Debug, Default, Clone)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    /// Comma-separated tag list; entries are trimmed and blank ones removed
    pub tags: Option<String>,
}

fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Split a comma-separated tag list, trimming whitespace and dropping blanks.
pub fn clean_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

impl VideoUpdate {
    /// Apply the requested fields to `video`, describing each change.
    pub fn apply(&self, video: &mut Video) -> Vec<String> {
        let snippet = &mut video.snippet;
        let mut changes = Vec::new();

        if let Some(title) = provided(&self.title) {
            snippet.title = title.to_string();
            changes.push(format!("[title: {}]", title));
        }
        if let Some(description) = provided(&self.description) {
            snippet.description = description.to_string();
            changes.push(format!("[description: {}]", description));
        }
        if let Some(category) = provided(&self.category_id) {
            snippet.category_id = Some(category.to_string());
            changes.push(format!("[categoryId: {}]", category));
        }
        if let Some(raw) = provided(&self.tags) {
            snippet.tags = clean_tags(raw);
            changes.push(format!("[tags: {}]", snippet.tags.join(",")));
        }

        changes
    }
}

/// Fetch a video, apply `update` and write it back.
pub async fn update_video(client: &YouTubeClient, video_id: &str, update: &VideoUpdate) -> Result<()> {
    if video_id.is_empty() {
        bail!("No video_id provided. Use --video to choose the video to update.");
    }

    let resp: ListResponse<Video> = client
        .get("videos", &[("part", "id,snippet"), ("id", video_id)])
        .await?;
    let Some(mut video) = resp.items.into_iter().next() else {
        bail!("No videos matched the provided id '{}'", video_id);
    };

    let changes = update.apply(&mut video);
    if changes.is_empty() {
        tracing::info!("Nothing to update for video {}", video_id);
        return Ok(());
    }

    tracing::info!(
        "Updating video (id={}). Updated Fields: {}",
        video_id,
        changes.join("")
    );
    let _: Video = client
        .put("videos", &[("part", "snippet")], &video)
        .await
        .with_context(|| format!("Error updating video {}", video_id))?;

    tracing::info!("Video updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::client_for;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_video() -> Video {
        serde_json::from_value(serde_json::json!({
            "id": "vid1",
            "snippet": {
                "title": "Old",
                "description": "Old description",
                "categoryId": "22",
                "tags": ["old"],
                "defaultLanguage": "pt-BR"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_clean_tags() {
        assert_eq!(
            clean_tags(" rust , cli,,  youtube "),
            vec!["rust", "cli", "youtube"]
        );
        assert_eq!(clean_tags("a,,b, "), vec!["a", "b"]);
        assert!(clean_tags("").is_empty());
    }

    #[test]
    fn test_apply_only_provided_fields() {
        let mut video = sample_video();
        let update = VideoUpdate {
            title: Some("New".into()),
            description: Some(String::new()),
            tags: Some("a, b".into()),
            ..Default::default()
        };

        let changes = update.apply(&mut video);
        assert_eq!(changes, vec!["[title: New]", "[tags: a,b]"]);
        assert_eq!(video.snippet.title, "New");
        assert_eq!(video.snippet.description, "Old description");
        assert_eq!(video.snippet.category_id.as_deref(), Some("22"));
        assert_eq!(video.snippet.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_nothing() {
        let mut video = sample_video();
        assert!(VideoUpdate::default().apply(&mut video).is_empty());
        assert_eq!(video.snippet.title, "Old");
    }

    #[test]
    fn test_unknown_snippet_fields_survive() {
        let mut video = sample_video();
        VideoUpdate {
            category_id: Some("10".into()),
            ..Default::default()
        }
        .apply(&mut video);

        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["snippet"]["defaultLanguage"], "pt-BR");
        assert_eq!(json["snippet"]["categoryId"], "10");
    }

    #[tokio::test]
    async fn test_update_sends_modified_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "vid1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [serde_json::to_value(sample_video()).unwrap()]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/videos"))
            .and(query_param("part", "snippet"))
            .and(body_partial_json(serde_json::json!({
                "id": "vid1",
                "snippet": {"title": "Fresh", "defaultLanguage": "pt-BR"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "vid1",
                "snippet": {"title": "Fresh"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let update = VideoUpdate {
            title: Some("Fresh".into()),
            ..Default::default()
        };
        update_video(&client, "vid1", &update).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_video_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let update = VideoUpdate {
            title: Some("x".into()),
            ..Default::default()
        };
        let err = update_video(&client, "missing", &update).await.unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
