//! Display-name changes: keep the roster nickname current.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use hellbot_gateway::RegistryStore;

use crate::events::GuildEvent;
use crate::router::EventHandler;

pub struct NicknameHandler {
    store: Arc<dyn RegistryStore>,
}

impl NicknameHandler {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for NicknameHandler {
    fn name(&self) -> &'static str {
        "nickname"
    }

    async fn handle(&self, event: &GuildEvent) -> Result<()> {
        let GuildEvent::MemberUpdated { before, after } = event else {
            return Ok(());
        };
        if before.display_name == after.display_name {
            return Ok(());
        }

        let nickname = after.display_name.trim();
        let matched = self
            .store
            .update_display_name(after.member_id, after.guild_id, nickname)
            .await?;
        if matched {
            tracing::info!(
                "updated roster nickname for member {} to '{nickname}'",
                after.member_id
            );
        } else {
            // Members who joined before registration existed have no roster
            // entry; update-only, never insert.
            tracing::warn!(
                "no roster entry found for member {} during nickname update",
                after.member_id
            );
        }
        Ok(())
    }
}
