//! Playlist contents and duplicate removal

use anyhow::{bail, Context, Result};
use std::collections::HashSet;

use super::client::YouTubeClient;
use crate::models::PlaylistItem;
use crate::output::TabWriter;

/// Print the videos of a playlist.
pub async fn list_playlist_items(client: &YouTubeClient, playlist: &str) -> Result<()> {
    if playlist.is_empty() {
        bail!("You must specify a playlist with the --playlist argument.");
    }

    let mut table = TabWriter::new(["#", "PUBLISHED_AT", "VIDEO", "STATUS", "URL"]);
    client
        .for_each_page(
            "playlistItems",
            &[
                ("part", "id,snippet,status,contentDetails"),
                ("playlistId", playlist),
            ],
            |page: Vec<PlaylistItem>| {
                for item in &page {
                    let n = table.len() + 1;
                    table.row(item_row(n, item));
                }
                Ok(())
            },
        )
        .await?;

    table.print();
    Ok(())
}

fn item_row(n: usize, item: &PlaylistItem) -> Vec<String> {
    vec![
        n.to_string(),
        item.snippet.published_at.clone().unwrap_or_default(),
        item.snippet.title.clone(),
        item.status.privacy_status.clone().unwrap_or_default(),
        format!("https://youtu.be/{}", item.content_details.video_id),
    ]
}

/// Result of scanning a playlist for repeated videos
#[derive(Debug)]
pub struct DedupPlan {
    /// Entries scanned
    pub total: usize,
    /// Distinct videos
    pub unique: usize,
    /// Entries to delete, in playlist order
    pub duplicates: Vec<PlaylistItem>,
}

impl DedupPlan {
    /// The first entry of each video is kept; every later one is a duplicate.
    pub fn from_items(items: Vec<PlaylistItem>) -> Self {
        let total = items.len();
        let mut seen = HashSet::with_capacity(total);
        let mut duplicates = Vec::new();

        for item in items {
            let video_id = item.content_details.video_id.clone();
            if !seen.insert(video_id) {
                tracing::info!(
                    "Duplicate video found with videoId={}; itemId={}",
                    item.content_details.video_id,
                    item.id
                );
                duplicates.push(item);
            }
        }

        Self {
            total,
            unique: seen.len(),
            duplicates,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
    }
}

/// Remove repeated videos from a playlist, keeping the first occurrence.
///
/// With `dry_run` the duplicates are only reported. Stops at the first
/// failed deletion.
pub async fn dedup_playlist(
    client: &YouTubeClient,
    playlist: &str,
    dry_run: bool,
) -> Result<DedupPlan> {
    if playlist.is_empty() {
        bail!("You must specify a playlist with the --playlist argument.");
    }

    let items: Vec<PlaylistItem> = client
        .list_all(
            "playlistItems",
            &[("part", "id,contentDetails"), ("playlistId", playlist)],
        )
        .await?;
    let plan = DedupPlan::from_items(items);

    if plan.is_clean() {
        tracing::info!(
            "Playlist has no duplicate videos ({} unique of {})",
            plan.unique,
            plan.total
        );
        return Ok(plan);
    }

    tracing::info!(
        "Removing duplicates from playlistId={}, will keep {} videos (down from {})",
        playlist,
        plan.unique,
        plan.total
    );

    for item in &plan.duplicates {
        if dry_run {
            tracing::info!("Would remove playlistItem {}", item.id);
            continue;
        }
        tracing::info!("> Will remove playlistItem {}", item.id);
        client
            .delete("playlistItems", &[("id", item.id.as_str())])
            .await
            .with_context(|| format!("Failed to remove playlistItem {}", item.id))?;
        tracing::info!("< Removed {}", item.id);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::client_for;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(id: &str, video: &str) -> PlaylistItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "contentDetails": {"videoId": video}
        }))
        .unwrap()
    }

    fn ids(items: &[PlaylistItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let plan = DedupPlan::from_items(vec![
            item("i1", "v1"),
            item("i2", "v2"),
            item("i3", "v1"),
            item("i4", "v3"),
            item("i5", "v2"),
            item("i6", "v1"),
        ]);

        assert_eq!(plan.total, 6);
        assert_eq!(plan.unique, 3);
        assert_eq!(ids(&plan.duplicates), vec!["i3", "i5", "i6"]);
    }

    #[test]
    fn test_clean_playlist() {
        let plan = DedupPlan::from_items(vec![item("i1", "v1"), item("i2", "v2")]);
        assert!(plan.is_clean());
        assert_eq!(plan.unique, plan.total);
    }

    #[test]
    fn test_empty_playlist() {
        let plan = DedupPlan::from_items(Vec::new());
        assert!(plan.is_clean());
        assert_eq!(plan.total, 0);
    }

    #[test]
    fn test_item_row() {
        let item: PlaylistItem = serde_json::from_value(serde_json::json!({
            "id": "i1",
            "snippet": {"publishedAt": "2024-01-02T03:04:05Z", "title": "Intro"},
            "status": {"privacyStatus": "public"},
            "contentDetails": {"videoId": "abc"}
        }))
        .unwrap();

        assert_eq!(
            item_row(4, &item),
            vec!["4", "2024-01-02T03:04:05Z", "Intro", "public", "https://youtu.be/abc"]
        );
    }

    #[tokio::test]
    async fn test_dedup_deletes_later_entries_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "i3", "contentDetails": {"videoId": "v1"}},
                    {"id": "i4", "contentDetails": {"videoId": "v3"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("playlistId", "PL1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "i1", "contentDetails": {"videoId": "v1"}},
                    {"id": "i2", "contentDetails": {"videoId": "v2"}}
                ],
                "nextPageToken": "next"
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/playlistItems"))
            .and(query_param("id", "i3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let plan = dedup_playlist(&client, "PL1", false).await.unwrap();
        assert_eq!(ids(&plan.duplicates), vec!["i3"]);
        assert_eq!(plan.unique, 3);
    }

    #[tokio::test]
    async fn test_dry_run_deletes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "i1", "contentDetails": {"videoId": "v1"}},
                    {"id": "i2", "contentDetails": {"videoId": "v1"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let plan = dedup_playlist(&client, "PL1", true).await.unwrap();
        assert_eq!(ids(&plan.duplicates), vec!["i2"]);
    }

    #[tokio::test]
    async fn test_failed_delete_stops_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "i1", "contentDetails": {"videoId": "v1"}},
                    {"id": "i2", "contentDetails": {"videoId": "v1"}},
                    {"id": "i3", "contentDetails": {"videoId": "v1"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = dedup_playlist(&client, "PL1", false).await.unwrap_err();
        assert!(format!("{:#}", err).contains("i2"));
    }

    #[tokio::test]
    async fn test_missing_playlist_is_usage_error() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        assert!(dedup_playlist(&client, "", false).await.is_err());
        assert!(list_playlist_items(&client, "").await.is_err());
    }
}
