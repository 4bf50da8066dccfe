//! Gateway-event translation into the typed guild event enum.

use std::sync::Arc;

use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::event::GuildMemberUpdateEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::GuildId as DiscordGuildId;
use serenity::model::user::User;

use hellbot_core::{GuildId, RoleId, UserId};
use hellbot_gateway::MemberProfile;
use hellbot_runtime::{EventRouter, GuildEvent};

use crate::chat_client::profile_from_member;

/// Translates gateway callbacks into typed guild events and hands each one to
/// the router. Translation never panics; an update that cannot be
/// reconstructed is dropped with a debug log.
pub struct DiscordEventBridge {
    router: Arc<EventRouter>,
}

impl DiscordEventBridge {
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self { router }
    }
}

fn guild_name(ctx: &Context, guild: DiscordGuildId) -> String {
    ctx.cache
        .guild(guild)
        .map(|guild| guild.name.clone())
        .unwrap_or_default()
}

fn profile_from_user(user: &User, guild: DiscordGuildId, guild_name: &str) -> MemberProfile {
    MemberProfile {
        member_id: UserId::new(user.id.get()),
        guild_id: GuildId::new(guild.get()),
        username: user.name.clone(),
        display_name: user
            .global_name
            .clone()
            .unwrap_or_else(|| user.name.clone()),
        guild_name: guild_name.to_string(),
        is_bot: user.bot,
        roles: Default::default(),
    }
}

fn profile_from_update(event: &GuildMemberUpdateEvent, guild_name: &str) -> MemberProfile {
    MemberProfile {
        member_id: UserId::new(event.user.id.get()),
        guild_id: GuildId::new(event.guild_id.get()),
        username: event.user.name.clone(),
        display_name: event
            .nick
            .clone()
            .or_else(|| event.user.global_name.clone())
            .unwrap_or_else(|| event.user.name.clone()),
        guild_name: guild_name.to_string(),
        is_bot: event.user.bot,
        roles: event.roles.iter().map(|role| RoleId::new(role.get())).collect(),
    }
}

#[async_trait]
impl EventHandler for DiscordEventBridge {
    async fn ready(&self, _ctx: Context, data: Ready) {
        tracing::info!("{} has logged in and is ready", data.user.name);
        let guild_ids = data
            .guilds
            .iter()
            .map(|guild| GuildId::new(guild.id.get()))
            .collect();
        self.router.dispatch(&GuildEvent::Ready { guild_ids }).await;
    }

    async fn guild_member_addition(&self, ctx: Context, member: Member) {
        let name = guild_name(&ctx, member.guild_id);
        let profile = profile_from_member(&member, &name);
        self.router.dispatch(&GuildEvent::MemberJoined(profile)).await;
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild: DiscordGuildId,
        user: User,
        member: Option<Member>,
    ) {
        let name = guild_name(&ctx, guild);
        let profile = match member {
            Some(member) => profile_from_member(&member, &name),
            None => profile_from_user(&user, guild, &name),
        };
        self.router.dispatch(&GuildEvent::MemberLeft(profile)).await;
    }

    async fn guild_member_update(
        &self,
        ctx: Context,
        old: Option<Member>,
        new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        let name = guild_name(&ctx, event.guild_id);
        // Without a cached before-snapshot there is nothing to diff against.
        let Some(before) = old.map(|member| profile_from_member(&member, &name)) else {
            tracing::debug!(
                "member update for {} arrived without a cached snapshot",
                event.user.id
            );
            return;
        };
        let after = match new {
            Some(member) => profile_from_member(&member, &name),
            None => profile_from_update(&event, &name),
        };
        self.router
            .dispatch(&GuildEvent::MemberUpdated { before, after })
            .await;
    }
}
