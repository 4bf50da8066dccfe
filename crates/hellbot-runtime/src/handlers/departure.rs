//! Member departure: a goodbye line in the KIA channel, nothing else.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;

use hellbot_core::ChannelId;
use hellbot_gateway::ChatClient;

use crate::events::GuildEvent;
use crate::router::EventHandler;

pub(crate) const GOODBYE_PHRASES: [&str; 10] = [
    "has left the server. Farewell!",
    "has departed. We'll miss you!",
    "is no longer with us. Safe travels!",
    "has moved on to new adventures.",
    "has left the fleet. Best wishes!",
    "has been honorably discharged. Thank you for your service!",
    "has set sail for new horizons.",
    "has bid us adieu. Until we meet again!",
    "has taken leave. We salute you!",
    "has exited the fleet. Good luck on your journey!",
];

pub struct DepartureHandler {
    chat: Arc<dyn ChatClient>,
    kia_channel: ChannelId,
}

impl DepartureHandler {
    pub fn new(chat: Arc<dyn ChatClient>, kia_channel: ChannelId) -> Self {
        Self { chat, kia_channel }
    }
}

#[async_trait]
impl EventHandler for DepartureHandler {
    fn name(&self) -> &'static str {
        "departure"
    }

    async fn handle(&self, event: &GuildEvent) -> Result<()> {
        let GuildEvent::MemberLeft(member) = event else {
            return Ok(());
        };

        let Some(channel) = self.chat.find_channel(self.kia_channel).await? else {
            tracing::error!("KIA channel {} not found", self.kia_channel);
            return Ok(());
        };

        let phrase = GOODBYE_PHRASES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(GOODBYE_PHRASES[0]);
        let message = format!("{} {}", member.display_name, phrase);
        self.chat.send_message(channel.id, &message).await?;
        tracing::info!("sent goodbye message for {}", member.display_name);
        Ok(())
    }
}
