//! Live broadcasts

use anyhow::Result;

use super::client::YouTubeClient;
use crate::models::LiveBroadcast;
use crate::output::TabWriter;

/// Print every broadcast of the account, oldest first.
pub async fn list_lives(client: &YouTubeClient) -> Result<()> {
    let mut lives: Vec<LiveBroadcast> = client
        .list_all(
            "liveBroadcasts",
            &[
                ("part", "id,snippet,contentDetails,status"),
                ("broadcastStatus", "all"),
            ],
        )
        .await?;
    sort_by_published(&mut lives);

    let mut table = TabWriter::new(["#", "PUBLISHED_AT", "ID", "TITLE", "STATUS", "URL"]);
    for (i, live) in lives.iter().enumerate() {
        table.row([
            (i + 1).to_string(),
            live.snippet.published_at.clone(),
            live.id.clone(),
            live.snippet.title.clone(),
            live.status.life_cycle_status.clone().unwrap_or_default(),
            format!("https://studio.youtube.com/video/{}/livestreaming", live.id),
        ]);
    }
    table.print();
    Ok(())
}

/// Stable sort on the RFC 3339 `publishedAt` strings.
fn sort_by_published(lives: &mut [LiveBroadcast]) {
    lives.sort_by(|a, b| a.snippet.published_at.cmp(&b.snippet.published_at));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(id: &str, published_at: &str) -> LiveBroadcast {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "snippet": {"publishedAt": published_at, "title": id}
        }))
        .unwrap()
    }

    #[test]
    fn test_sorted_oldest_first_and_stable() {
        let mut lives = vec![
            live("c", "2024-03-01T00:00:00Z"),
            live("a", "2023-01-01T00:00:00Z"),
            live("b1", "2023-06-01T00:00:00Z"),
            live("b2", "2023-06-01T00:00:00Z"),
        ];
        sort_by_published(&mut lives);

        let ids: Vec<&str> = lives.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b1", "b2", "c"]);
    }
}
