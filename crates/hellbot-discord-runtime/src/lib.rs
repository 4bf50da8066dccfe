//! Discord runtime: the serenity-backed chat capability and the gateway
//! event bridge that feeds the router.

mod chat_client;
mod event_bridge;

pub use chat_client::DiscordChatClient;
pub use event_bridge::DiscordEventBridge;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serenity::prelude::GatewayIntents;

use hellbot_runtime::EventRouter;

/// Connects to the gateway and runs the event loop until the client stops.
pub async fn run(token: &str, router: Arc<EventRouter>) -> Result<()> {
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
    let mut client = serenity::Client::builder(token, intents)
        .event_handler(DiscordEventBridge::new(router))
        .await
        .context("failed to build discord client")?;
    client.start().await.context("discord client terminated")?;
    Ok(())
}
