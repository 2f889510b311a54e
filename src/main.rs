//! youtube - command-line client for the YouTube Data API
//!
//! Authorizes once through the browser, caches the token, and manages
//! channels, playlists and videos from the terminal.

mod api;
mod auth;
mod config;
mod models;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{VideoUpdate, YouTubeClient, YOUTUBE_SCOPE};
use auth::{ClientFactory, ClientSecrets};
use config::Config;

/// Token cache key for the YouTube Data API
const YOUTUBE_API: &str = "youtube";

#[derive(Parser)]
#[command(name = "youtube")]
#[command(about = "Command-line client for the YouTube Data API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// OAuth client secrets JSON (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    client_secrets: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List channels of the authorized account
    Channels,

    /// List subscribers of the authorized account
    #[command(alias = "subs")]
    Subscribers,

    /// List playlists
    Playlists {
        /// Channel ID (defaults to your own channel)
        #[arg(long)]
        channel: Option<String>,
    },

    /// List videos in a playlist
    #[command(alias = "playlist-videos")]
    PlaylistItems {
        /// Playlist ID
        #[arg(long)]
        playlist: String,
    },

    /// Remove duplicate videos from a playlist
    #[command(alias = "dedup-playlist")]
    PlaylistDedup {
        /// Playlist ID
        #[arg(long)]
        playlist: String,

        /// Report duplicates without removing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Update the metadata of a video
    VideoUpdate {
        /// Video ID
        #[arg(long)]
        video: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        desc: Option<String>,

        /// New category ID
        #[arg(long)]
        category: Option<String>,

        /// Comma-separated list of tags, replacing the current ones (blank entries are dropped)
        #[arg(long)]
        tags: Option<String>,
    },

    /// List live broadcasts, oldest first
    Lives,

    /// Clear the cached token; the next command authorizes again
    #[command(alias = "reauth")]
    Logout,

    /// Show the cached token
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Logout => {
            auth::logout(&config.token_cache()?, YOUTUBE_API)?;
        }
        Commands::Status => {
            for line in auth::status_report(&config.token_cache()?, YOUTUBE_API) {
                println!("{}", line);
            }
        }
        command => {
            let client = connect(&config, cli.client_secrets).await?;
            run(&client, command).await?;
        }
    }

    Ok(())
}

/// Authorized YouTube client, prompting for authorization if needed.
async fn connect(config: &Config, secrets_flag: Option<PathBuf>) -> Result<YouTubeClient> {
    let secrets_path = match secrets_flag {
        Some(path) => path,
        None => config.client_secrets_path()?,
    };
    let secrets = ClientSecrets::from_file(&secrets_path)
        .with_context(|| format!("Unable to load client secrets from {}", secrets_path.display()))?;

    let factory = ClientFactory::new(secrets, config.token_cache()?)
        .with_timeout(config.callback_timeout())
        .with_port(config.callback_port());
    let auth = factory.new_client(YOUTUBE_API, &[YOUTUBE_SCOPE]).await?;

    let client = YouTubeClient::new(auth);
    Ok(match &config.api_base {
        Some(base) => client.with_base_url(base.as_str()),
        None => client,
    })
}

async fn run(client: &YouTubeClient, command: Commands) -> Result<()> {
    match command {
        Commands::Channels => api::list_channels(client).await?,
        Commands::Subscribers => api::list_subscribers(client).await?,
        Commands::Playlists { channel } => api::list_playlists(client, channel.as_deref()).await?,
        Commands::PlaylistItems { playlist } => api::list_playlist_items(client, &playlist).await?,
        Commands::PlaylistDedup { playlist, dry_run } => {
            let plan = api::dedup_playlist(client, &playlist, dry_run).await?;
            if dry_run && !plan.is_clean() {
                println!(
                    "{} duplicate entries would be removed ({} unique of {})",
                    plan.duplicates.len(),
                    plan.unique,
                    plan.total
                );
            }
        }
        Commands::VideoUpdate {
            video,
            title,
            desc,
            category,
            tags,
        } => {
            let update = VideoUpdate {
                title,
                description: desc,
                category_id: category,
                tags,
            };
            api::update_video(client, &video, &update).await?;
        }
        Commands::Lives => api::list_lives(client).await?,
        Commands::Logout | Commands::Status => bail!("command does not use the API client"),
    }
    Ok(())
}
