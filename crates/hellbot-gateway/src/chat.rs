//! Chat-platform capability interface.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use hellbot_core::{ChannelId, GuildId, RoleId, UserId};

/// A resolved channel reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
}

/// A resolved role reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
}

/// Snapshot of a member as seen by the platform at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub member_id: UserId,
    pub guild_id: GuildId,
    /// Platform account name.
    pub username: String,
    /// Current in-guild display name.
    pub display_name: String,
    pub guild_name: String,
    pub is_bot: bool,
    pub roles: BTreeSet<RoleId>,
}

impl MemberProfile {
    /// Renders the platform mention token for this member.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.member_id)
    }

    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Outcome split for role mutation: the platform distinguishes a rejected
/// mutation from transport-level failure, and batch operations count them
/// differently.
#[derive(Debug, Error)]
pub enum RoleAssignError {
    #[error("platform rejected the role mutation: insufficient permission")]
    PermissionDenied,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The bot's standing to mutate a given role in a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAuthority {
    pub can_manage_roles: bool,
    /// Whether the bot's highest role ranks above the target role.
    pub ranks_above_target: bool,
}

impl RoleAuthority {
    pub fn permits_assignment(&self) -> bool {
        self.can_manage_roles && self.ranks_above_target
    }
}

/// Chat-platform client capability.
///
/// Every method is a suspension point; implementations must not block the
/// runtime. Resolution methods return `Ok(None)` for an identity the platform
/// does not know, reserving `Err` for transport failures.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn find_channel(&self, channel: ChannelId) -> Result<Option<ChannelInfo>>;

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<()>;

    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<Option<RoleInfo>>;

    async fn assign_role(
        &self,
        guild: GuildId,
        member: UserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), RoleAssignError>;

    /// Fresh role-possession check, bypassing any snapshot the caller holds.
    async fn member_has_role(&self, guild: GuildId, member: UserId, role: RoleId) -> Result<bool>;

    /// Enumerates all current guild members, bots included.
    async fn list_members(&self, guild: GuildId) -> Result<Vec<MemberProfile>>;

    async fn role_authority(&self, guild: GuildId, role: RoleId) -> Result<RoleAuthority>;
}
