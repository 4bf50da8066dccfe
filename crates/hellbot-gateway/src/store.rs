//! Document-store capability interface and the roster document it persists.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hellbot_core::{GuildId, UserId};

use crate::chat::MemberProfile;

/// One roster entry per (member, guild) pair.
///
/// Field names match the persisted document schema. The record is historical:
/// departure never deletes it, and `registered_at` is written once on first
/// insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRegistration {
    pub discord_id: String,
    pub discord_server_id: String,
    /// Platform account name at registration time.
    pub player_name: String,
    pub server_name: String,
    pub server_nickname: String,
    pub registered_at: String,
}

impl MemberRegistration {
    /// Builds a registration from a live member snapshot, trimming the
    /// free-text fields.
    pub fn from_profile(profile: &MemberProfile, registered_at: String) -> Self {
        Self {
            discord_id: profile.member_id.to_string(),
            discord_server_id: profile.guild_id.to_string(),
            player_name: profile.username.trim().to_string(),
            server_name: profile.guild_name.trim().to_string(),
            server_nickname: profile.display_name.trim().to_string(),
            registered_at,
        }
    }
}

/// Document-store capability.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Inserts or refreshes the registration keyed on
    /// (`discord_id`, `discord_server_id`). An existing document keeps its
    /// original `registered_at`.
    async fn upsert_registration(&self, registration: &MemberRegistration) -> Result<()>;

    /// Updates `server_nickname` for an existing registration. Returns whether
    /// a document matched; never inserts.
    async fn update_display_name(
        &self,
        member: UserId,
        guild: GuildId,
        display_name: &str,
    ) -> Result<bool>;

    /// Reads the completed-mission counter for a user, `None` when no
    /// statistics record exists.
    async fn completed_missions(&self, user: UserId) -> Result<Option<i64>>;
}
