//! New-member arrival: welcome message, standard role, roster registration.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use hellbot_core::{utc_timestamp_iso8601, ChannelId, RoleId};
use hellbot_gateway::{ChatClient, MemberProfile, MemberRegistration, RegistryStore};

use crate::events::GuildEvent;
use crate::router::EventHandler;

const ARRIVAL_ROLE_REASON: &str = "New member arrival";

pub struct ArrivalHandler {
    chat: Arc<dyn ChatClient>,
    store: Arc<dyn RegistryStore>,
    welcome_channel: ChannelId,
    standard_role: RoleId,
}

impl ArrivalHandler {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        store: Arc<dyn RegistryStore>,
        welcome_channel: ChannelId,
        standard_role: RoleId,
    ) -> Self {
        Self {
            chat,
            store,
            welcome_channel,
            standard_role,
        }
    }
}

fn welcome_message(member: &MemberProfile) -> String {
    format!(
        "Welcome {} to the server!\n\
         Thank you for your service and interest in becoming a part of our community!\n\
         If you have any questions, please ask.\n\
         If you need moderation, please make a ticket.\n\
         If you are looking for LFG, use the GPT Network.\n\
         IRL comes first, everything is viable, and do your best!",
        member.mention()
    )
}

#[async_trait]
impl EventHandler for ArrivalHandler {
    fn name(&self) -> &'static str {
        "arrival"
    }

    async fn handle(&self, event: &GuildEvent) -> Result<()> {
        let GuildEvent::MemberJoined(member) = event else {
            return Ok(());
        };

        let Some(channel) = self.chat.find_channel(self.welcome_channel).await? else {
            tracing::error!("welcome channel {} not found", self.welcome_channel);
            return Ok(());
        };
        self.chat
            .send_message(channel.id, &welcome_message(member))
            .await?;

        // Role assignment is a precondition for registration.
        let Some(role) = self
            .chat
            .find_role(member.guild_id, self.standard_role)
            .await?
        else {
            tracing::error!(
                "role {} not found in guild {}",
                self.standard_role,
                member.guild_id
            );
            return Ok(());
        };
        self.chat
            .assign_role(member.guild_id, member.member_id, role.id, ARRIVAL_ROLE_REASON)
            .await
            .map_err(anyhow::Error::from)?;
        tracing::info!("assigned role '{}' to {}", role.name, member.display_name);

        let registration = MemberRegistration::from_profile(member, utc_timestamp_iso8601());
        self.store.upsert_registration(&registration).await?;
        tracing::info!(
            "registered new member {} in the alliance roster",
            member.display_name
        );
        Ok(())
    }
}
