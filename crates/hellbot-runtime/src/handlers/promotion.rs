//! Role-change reactions: academy welcome for cadets, promotion announcement
//! for class-A graduates.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use hellbot_core::{ChannelId, RoleId};
use hellbot_gateway::{ChatClient, MemberProfile, RegistryStore};

use crate::events::GuildEvent;
use crate::router::EventHandler;

pub struct PromotionHandler {
    chat: Arc<dyn ChatClient>,
    store: Arc<dyn RegistryStore>,
    cadet_role: RoleId,
    cadet_chat: ChannelId,
    class_a_role: RoleId,
    welcome_channel: ChannelId,
}

impl PromotionHandler {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        store: Arc<dyn RegistryStore>,
        cadet_role: RoleId,
        cadet_chat: ChannelId,
        class_a_role: RoleId,
        welcome_channel: ChannelId,
    ) -> Self {
        Self {
            chat,
            store,
            cadet_role,
            cadet_chat,
            class_a_role,
            welcome_channel,
        }
    }

    async fn react_to_role(&self, member: &MemberProfile, role: RoleId) -> Result<()> {
        if role == self.cadet_role {
            match self.chat.find_channel(self.cadet_chat).await? {
                Some(channel) => {
                    self.chat
                        .send_message(channel.id, &academy_welcome(member))
                        .await?;
                    tracing::info!(
                        "sent academy welcome for {} in the cadet chat",
                        member.display_name
                    );
                }
                None => tracing::error!("cadet chat channel {} not found", self.cadet_chat),
            }
        }

        if role == self.class_a_role {
            // A lookup failure reads as "no record": the announcement is
            // suppressed rather than retried or surfaced in chat.
            let missions = match self.store.completed_missions(member.member_id).await {
                Ok(value) => value,
                Err(error) => {
                    tracing::error!(
                        "failed to fetch completed missions for member {}: {error:#}",
                        member.member_id
                    );
                    None
                }
            };
            if let Some(count) = missions {
                match self.chat.find_channel(self.welcome_channel).await? {
                    Some(channel) => {
                        self.chat
                            .send_message(channel.id, &promotion_announcement(member, count))
                            .await?;
                        tracing::info!(
                            "announced class-A promotion for {}",
                            member.display_name
                        );
                    }
                    None => {
                        tracing::error!("welcome channel {} not found", self.welcome_channel)
                    }
                }
            }
        }

        Ok(())
    }
}

fn academy_welcome(member: &MemberProfile) -> String {
    format!(
        "Welcome {} to the Officer Academy for GPT Fleet: Class #12! \u{2728} \
         Your road to clan leadership begins here.",
        member.mention()
    )
}

fn promotion_announcement(member: &MemberProfile, completed_missions: i64) -> String {
    format!(
        "\u{1F389} Congratulations {}! You have achieved **Class A Citizen** status \
         by completing {completed_missions} missions! \u{1F389}",
        member.mention()
    )
}

#[async_trait]
impl EventHandler for PromotionHandler {
    fn name(&self) -> &'static str {
        "promotion"
    }

    async fn handle(&self, event: &GuildEvent) -> Result<()> {
        let GuildEvent::MemberUpdated { before, after } = event else {
            return Ok(());
        };
        if before.roles == after.roles {
            return Ok(());
        }

        // Only roles newly present react; removals are ignored. Each added
        // role is processed independently so one failure cannot shadow the
        // others.
        for role in after.roles.difference(&before.roles) {
            if let Err(error) = self.react_to_role(after, *role).await {
                tracing::error!(
                    "role reaction for {} on {} failed: {error:#}",
                    role,
                    after.display_name
                );
            }
        }
        Ok(())
    }
}
