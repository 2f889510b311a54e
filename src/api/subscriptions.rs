//! Channels subscribed to the authorized account

use anyhow::Result;

use super::client::YouTubeClient;
use crate::models::Subscription;
use crate::output::{truncate, TabWriter};

const DESCRIPTION_WIDTH: usize = 40;

/// Print subscribers in alphabetical order.
pub async fn list_subscribers(client: &YouTubeClient) -> Result<()> {
    let mut table = TabWriter::new(["#", "NAME", "DESCRIPTION", "URL"]);

    client
        .for_each_page(
            "subscriptions",
            &[
                ("part", "subscriberSnippet"),
                ("mySubscribers", "true"),
                ("order", "alphabetical"),
            ],
            |page: Vec<Subscription>| {
                for sub in &page {
                    let n = table.len() + 1;
                    table.row(subscriber_row(n, sub));
                }
                Ok(())
            },
        )
        .await?;

    table.print();
    Ok(())
}

fn subscriber_row(n: usize, sub: &Subscription) -> Vec<String> {
    let snippet = &sub.subscriber_snippet;
    let first_line = snippet.description.lines().next().unwrap_or("");
    vec![
        n.to_string(),
        snippet.title.clone(),
        truncate(first_line, DESCRIPTION_WIDTH),
        format!("https://www.youtube.com/channel/{}", snippet.channel_id),
    ]
}
