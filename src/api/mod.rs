//! YouTube Data API commands

mod broadcasts;
mod channels;
pub mod client;
mod playlist_items;
mod playlists;
mod subscriptions;
mod videos;

use anyhow::Result;

pub use client::{YouTubeClient, YOUTUBE_SCOPE};
pub use playlist_items::DedupPlan;
pub use videos::VideoUpdate;

/// List channels of the authorized account
pub async fn list_channels(client: &YouTubeClient) -> Result<()> {
    channels::list_channels(client).await
}

/// List subscribers of the authorized account
pub async fn list_subscribers(client: &YouTubeClient) -> Result<()> {
    subscriptions::list_subscribers(client).await
}

/// List playlists, of `channel` if given
pub async fn list_playlists(client: &YouTubeClient, channel: Option<&str>) -> Result<()> {
    playlists::list_playlists(client, channel).await
}

/// List videos in a playlist
pub async fn list_playlist_items(client: &YouTubeClient, playlist: &str) -> Result<()> {
    playlist_items::list_playlist_items(client, playlist).await
}

/// Remove duplicate videos from a playlist
pub async fn dedup_playlist(
    client: &YouTubeClient,
    playlist: &str,
    dry_run: bool,
) -> Result<DedupPlan> {
    playlist_items::dedup_playlist(client, playlist, dry_run).await
}

/// Update title, description, category or tags of a video
pub async fn update_video(client: &YouTubeClient, video: &str, update: &VideoUpdate) -> Result<()> {
    videos::update_video(client, video, update).await
}

/// List live broadcasts, oldest first
pub async fn list_lives(client: &YouTubeClient) -> Result<()> {
    broadcasts::list_lives(client).await
}
