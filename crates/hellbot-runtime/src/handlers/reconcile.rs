//! Startup role backfill: every human member of every guild receives the
//! standard role, paced to stay under platform rate limits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use hellbot_core::{GuildId, RoleId};
use hellbot_gateway::{ChatClient, RoleAssignError};

use crate::events::GuildEvent;
use crate::router::EventHandler;

const BACKFILL_REASON: &str = "Standard member backfill";
const DEFAULT_ASSIGN_PACE: Duration = Duration::from_millis(1_200);

/// Per-guild outcome counts for one backfill sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuildBackfillSummary {
    /// Role assignments that succeeded.
    pub assigned: usize,
    /// Members who gained the role between enumeration and mutation.
    pub already_had: usize,
    /// Members excluded up front because they already held the role.
    pub skipped_existing: usize,
    /// Assignment attempts that errored.
    pub failed: usize,
}

pub struct ReconcileHandler {
    chat: Arc<dyn ChatClient>,
    standard_role: RoleId,
    assign_pace: Duration,
    started: AtomicBool,
}

impl ReconcileHandler {
    pub fn new(chat: Arc<dyn ChatClient>, standard_role: RoleId) -> Self {
        Self::with_pace(chat, standard_role, DEFAULT_ASSIGN_PACE)
    }

    /// Overrides the inter-assignment delay.
    pub fn with_pace(
        chat: Arc<dyn ChatClient>,
        standard_role: RoleId,
        assign_pace: Duration,
    ) -> Self {
        Self {
            chat,
            standard_role,
            assign_pace,
            started: AtomicBool::new(false),
        }
    }

    pub(crate) async fn backfill_guild(&self, guild: GuildId) -> Result<GuildBackfillSummary> {
        let Some(role) = self.chat.find_role(guild, self.standard_role).await? else {
            tracing::warn!(
                "role {} not found in guild {guild}, skipping backfill",
                self.standard_role
            );
            return Ok(GuildBackfillSummary::default());
        };

        let authority = self.chat.role_authority(guild, role.id).await?;
        if !authority.can_manage_roles {
            tracing::error!("missing manage-roles permission in guild {guild}, skipping backfill");
            return Ok(GuildBackfillSummary::default());
        }
        if !authority.ranks_above_target {
            tracing::error!(
                "role '{}' ranks at or above the bot's top role in guild {guild}, skipping backfill",
                role.name
            );
            return Ok(GuildBackfillSummary::default());
        }

        let members = self.chat.list_members(guild).await?;
        let humans: Vec<_> = members.iter().filter(|member| !member.is_bot).collect();
        let (holders, missing): (Vec<_>, Vec<_>) =
            humans.into_iter().partition(|member| member.has_role(role.id));

        let mut summary = GuildBackfillSummary {
            skipped_existing: holders.len(),
            ..GuildBackfillSummary::default()
        };
        if missing.is_empty() {
            tracing::info!("all members of guild {guild} already hold '{}'", role.name);
            return Ok(summary);
        }

        tracing::info!(
            "backfilling '{}' for {} members of guild {guild}",
            role.name,
            missing.len()
        );
        for member in missing {
            // The member may have gained the role since enumeration, e.g. a
            // concurrent manual grant; re-check right before mutating.
            match self
                .chat
                .member_has_role(guild, member.member_id, role.id)
                .await
            {
                Ok(true) => {
                    summary.already_had += 1;
                    tracing::info!(
                        "{} gained '{}' mid-backfill, skipping",
                        member.display_name,
                        role.name
                    );
                }
                Ok(false) => {
                    match self
                        .chat
                        .assign_role(guild, member.member_id, role.id, BACKFILL_REASON)
                        .await
                    {
                        Ok(()) => summary.assigned += 1,
                        Err(RoleAssignError::PermissionDenied) => {
                            summary.failed += 1;
                            tracing::error!(
                                "permission denied assigning '{}' to {}",
                                role.name,
                                member.display_name
                            );
                        }
                        Err(error) => {
                            summary.failed += 1;
                            tracing::error!(
                                "failed to assign '{}' to {}: {error:#}",
                                role.name,
                                member.display_name
                            );
                        }
                    }
                }
                Err(error) => {
                    summary.failed += 1;
                    tracing::error!(
                        "failed to re-check roles for {}: {error:#}",
                        member.display_name
                    );
                }
            }
            tokio::time::sleep(self.assign_pace).await;
        }

        tracing::info!(
            "guild {guild} backfill complete: assigned={} already_had={} skipped_existing={} failed={}",
            summary.assigned,
            summary.already_had,
            summary.skipped_existing,
            summary.failed
        );
        Ok(summary)
    }
}

#[async_trait]
impl EventHandler for ReconcileHandler {
    fn name(&self) -> &'static str {
        "reconcile"
    }

    async fn handle(&self, event: &GuildEvent) -> Result<()> {
        let GuildEvent::Ready { guild_ids } = event else {
            return Ok(());
        };
        // Ready re-fires on gateway reconnects; the backfill runs once per
        // process.
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for guild in guild_ids {
            if let Err(error) = self.backfill_guild(*guild).await {
                tracing::error!("backfill failed for guild {guild}: {error:#}");
            }
        }
        Ok(())
    }
}
