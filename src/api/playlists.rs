//! Playlists of the account or of a given channel

use anyhow::Result;

use super::client::YouTubeClient;
use crate::models::Playlist;
use crate::output::TabWriter;

/// Print playlists of `channel`, or of the authorized account when `None`.
pub async fn list_playlists(client: &YouTubeClient, channel: Option<&str>) -> Result<()> {
    let mut params = vec![("part", "id,snippet,status,contentDetails")];
    match channel {
        Some(id) => params.push(("channelId", id)),
        None => params.push(("mine", "true")),
    }

    let mut table = TabWriter::new(["#", "ID", "NAME", "CHANNEL", "VISIBILITY", "VIDEOS"]);
    client
        .for_each_page("playlists", &params, |page: Vec<Playlist>| {
            for p in &page {
                let n = table.len() + 1;
                table.row(playlist_row(n, p));
            }
            Ok(())
        })
        .await?;

    table.print();
    Ok(())
}

fn playlist_row(n: usize, p: &Playlist) -> Vec<String> {
    vec![
        n.to_string(),
        p.id.clone(),
        p.snippet.title.clone(),
        p.snippet.channel_title.clone(),
        p.status.privacy_status.clone().unwrap_or_default(),
        p.content_details
            .item_count
            .map(|c| c.to_string())
            .unwrap_or_default(),
    ]
}
