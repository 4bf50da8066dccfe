//! Serenity-backed implementation of the chat-platform capability.
//!
//! Every identity is re-resolved against the HTTP API per call; nothing is
//! cached here, so handlers always see fresh platform state.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use async_trait::async_trait;
use serenity::http::{Http, HttpError};
use serenity::model::channel::Channel;
use serenity::model::guild::Member;
use serenity::model::id::{
    ChannelId as DiscordChannelId, GuildId as DiscordGuildId, RoleId as DiscordRoleId,
    UserId as DiscordUserId,
};
use serenity::model::permissions::Permissions;

use hellbot_core::{ChannelId, GuildId, RoleId, UserId};
use hellbot_gateway::{
    ChannelInfo, ChatClient, MemberProfile, RoleAssignError, RoleAuthority, RoleInfo,
};

const MEMBER_PAGE: u64 = 1_000;

pub struct DiscordChatClient {
    http: Arc<Http>,
}

impl DiscordChatClient {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Builds a client with its own HTTP handle from a bot token.
    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }
}

fn discord_channel(id: ChannelId) -> DiscordChannelId {
    DiscordChannelId::new(id.get())
}

fn discord_guild(id: GuildId) -> DiscordGuildId {
    DiscordGuildId::new(id.get())
}

fn discord_role(id: RoleId) -> DiscordRoleId {
    DiscordRoleId::new(id.get())
}

fn discord_user(id: UserId) -> DiscordUserId {
    DiscordUserId::new(id.get())
}

fn status_of(error: &serenity::Error) -> Option<u16> {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            Some(response.status_code.as_u16())
        }
        _ => None,
    }
}

fn describe_channel(id: ChannelId, channel: &Channel) -> ChannelInfo {
    let name = match channel {
        Channel::Guild(guild_channel) => guild_channel.name.clone(),
        Channel::Private(private) => private.name(),
        _ => String::new(),
    };
    ChannelInfo { id, name }
}

pub(crate) fn profile_from_member(member: &Member, guild_name: &str) -> MemberProfile {
    MemberProfile {
        member_id: UserId::new(member.user.id.get()),
        guild_id: GuildId::new(member.guild_id.get()),
        username: member.user.name.clone(),
        display_name: member.display_name().to_string(),
        guild_name: guild_name.to_string(),
        is_bot: member.user.bot,
        roles: member.roles.iter().map(|role| RoleId::new(role.get())).collect(),
    }
}

fn grants_role_management(permissions: Permissions) -> bool {
    permissions.contains(Permissions::MANAGE_ROLES)
        || permissions.contains(Permissions::ADMINISTRATOR)
}

#[async_trait]
impl ChatClient for DiscordChatClient {
    async fn find_channel(&self, channel: ChannelId) -> Result<Option<ChannelInfo>> {
        match self.http.get_channel(discord_channel(channel)).await {
            Ok(found) => Ok(Some(describe_channel(channel, &found))),
            Err(error) if status_of(&error) == Some(404) => Ok(None),
            Err(error) => Err(anyhow::Error::new(error)
                .context(format!("channel {channel} lookup failed"))),
        }
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<()> {
        discord_channel(channel)
            .say(self.http.as_ref(), text)
            .await
            .map(drop)
            .with_context(|| format!("failed to send message to channel {channel}"))
    }

    async fn find_role(&self, guild: GuildId, role: RoleId) -> Result<Option<RoleInfo>> {
        let roles = self
            .http
            .get_guild_roles(discord_guild(guild))
            .await
            .with_context(|| format!("failed to list roles for guild {guild}"))?;
        Ok(roles
            .into_iter()
            .find(|candidate| candidate.id == discord_role(role))
            .map(|found| RoleInfo {
                id: role,
                name: found.name,
            }))
    }

    async fn assign_role(
        &self,
        guild: GuildId,
        member: UserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), RoleAssignError> {
        self.http
            .add_member_role(
                discord_guild(guild),
                discord_user(member),
                discord_role(role),
                Some(reason),
            )
            .await
            .map_err(|error| match status_of(&error) {
                Some(403) => RoleAssignError::PermissionDenied,
                _ => RoleAssignError::Other(
                    anyhow::Error::new(error).context(format!(
                        "failed to assign role {role} to member {member} in guild {guild}"
                    )),
                ),
            })
    }

    async fn member_has_role(&self, guild: GuildId, member: UserId, role: RoleId) -> Result<bool> {
        let member = self
            .http
            .get_member(discord_guild(guild), discord_user(member))
            .await
            .with_context(|| format!("failed to fetch member {member} of guild {guild}"))?;
        Ok(member.roles.contains(&discord_role(role)))
    }

    async fn list_members(&self, guild: GuildId) -> Result<Vec<MemberProfile>> {
        let guild_name = self
            .http
            .get_guild(discord_guild(guild))
            .await
            .with_context(|| format!("failed to fetch guild {guild}"))?
            .name;

        let mut profiles = Vec::new();
        let mut after: Option<u64> = None;
        loop {
            let page = self
                .http
                .get_guild_members(discord_guild(guild), Some(MEMBER_PAGE), after)
                .await
                .with_context(|| format!("failed to enumerate members of guild {guild}"))?;
            let full_page = page.len() as u64 == MEMBER_PAGE;
            after = page.last().map(|member| member.user.id.get());
            profiles.extend(
                page.iter()
                    .map(|member| profile_from_member(member, &guild_name)),
            );
            if !full_page {
                break;
            }
        }
        Ok(profiles)
    }

    async fn role_authority(&self, guild: GuildId, role: RoleId) -> Result<RoleAuthority> {
        let guild_data = self
            .http
            .get_guild(discord_guild(guild))
            .await
            .with_context(|| format!("failed to fetch guild {guild}"))?;
        let Some(target) = guild_data.roles.get(&discord_role(role)) else {
            bail!("role {role} not found in guild {guild} during authority check");
        };

        let current_user = self
            .http
            .get_current_user()
            .await
            .context("failed to resolve own user")?;
        if guild_data.owner_id == current_user.id {
            return Ok(RoleAuthority {
                can_manage_roles: true,
                ranks_above_target: true,
            });
        }

        let own_member = self
            .http
            .get_member(discord_guild(guild), current_user.id)
            .await
            .with_context(|| format!("failed to fetch own membership in guild {guild}"))?;

        let mut can_manage_roles = false;
        let mut ranks_above_target = false;
        // Baseline permissions come from @everyone, which never outranks a
        // real role.
        if let Some(everyone) = guild_data.roles.get(&DiscordRoleId::new(guild.get())) {
            can_manage_roles |= grants_role_management(everyone.permissions);
        }
        for role_id in &own_member.roles {
            if let Some(owned) = guild_data.roles.get(role_id) {
                can_manage_roles |= grants_role_management(owned.permissions);
                ranks_above_target |= owned.position > target.position;
            }
        }
        Ok(RoleAuthority {
            can_manage_roles,
            ranks_above_target,
        })
    }
}
