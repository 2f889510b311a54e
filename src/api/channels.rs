//! Channels owned by the authorized account

use anyhow::Result;

use super::client::YouTubeClient;
use crate::models::Channel;
use crate::output::TabWriter;

/// Print the account's channels as a table.
pub async fn list_channels(client: &YouTubeClient) -> Result<()> {
    let mut table = TabWriter::new([
        "#",
        "ID",
        "NAME",
        "LANGUAGE",
        "URL",
        "SUBSCRIBERS",
        "VIDEOS",
        "UPLOADS_PLAYLIST",
        "VIEWS",
    ]);

    client
        .for_each_page(
            "channels",
            &[("part", "id,snippet,statistics,contentDetails"), ("mine", "true")],
            |page: Vec<Channel>| {
                for ch in &page {
                    let n = table.len() + 1;
                    table.row(channel_row(n, ch));
                }
                Ok(())
            },
        )
        .await?;

    table.print();
    Ok(())
}

fn channel_row(n: usize, ch: &Channel) -> Vec<String> {
    let stats = &ch.statistics;
    vec![
        n.to_string(),
        ch.id.clone(),
        ch.snippet.title.clone(),
        ch.snippet.default_language.clone().unwrap_or_default(),
        ch.snippet.custom_url.clone().unwrap_or_default(),
        stats.subscriber_count.clone().unwrap_or_default(),
        stats.video_count.clone().unwrap_or_default(),
        ch.content_details
            .related_playlists
            .uploads
            .clone()
            .unwrap_or_default(),
        stats.view_count.clone().unwrap_or_default(),
    ]
}
