//! Environment-driven bot configuration.
//!
//! Every identifier the bot touches is required; a missing or malformed
//! variable aborts startup before any connection is opened.

use thiserror::Error;

use crate::ids::{ChannelId, GuildId, RoleId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("environment variable {name} is not a valid platform id: {value:?}")]
    InvalidId { name: &'static str, value: String },
}

/// Fully-validated runtime configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub mongo_uri: String,
    pub standard_role: RoleId,
    pub welcome_channel: ChannelId,
    pub monitor_channel: ChannelId,
    pub leaderboard_channel: ChannelId,
    pub kia_channel: ChannelId,
    pub bot_home_channel: ChannelId,
    pub class_a_role: RoleId,
    pub guild: GuildId,
    pub sos_network: ChannelId,
    pub cadet_role: RoleId,
    pub cadet_chat: ChannelId,
}

impl BotConfig {
    /// Loads and validates the configuration from process environment
    /// variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            discord_token: required(&lookup, "DISCORD_TOKEN")?,
            mongo_uri: required(&lookup, "MONGODB_URI")?,
            standard_role: RoleId::new(required_id(&lookup, "ROLE_TO_ASSIGN_ID")?),
            welcome_channel: ChannelId::new(required_id(&lookup, "WELCOME_CHANNEL_ID")?),
            monitor_channel: ChannelId::new(required_id(&lookup, "MONITOR_CHANNEL_ID")?),
            leaderboard_channel: ChannelId::new(required_id(&lookup, "LEADERBOARD_CHANNEL_ID")?),
            kia_channel: ChannelId::new(required_id(&lookup, "KIA_CHANNEL_ID")?),
            bot_home_channel: ChannelId::new(required_id(&lookup, "BOT_CHANNEL_ID")?),
            class_a_role: RoleId::new(required_id(&lookup, "CLASS_A_ROLE_ID")?),
            guild: GuildId::new(required_id(&lookup, "GUILD_ID")?),
            sos_network: ChannelId::new(required_id(&lookup, "SOS_NETWORK_ID")?),
            cadet_role: RoleId::new(required_id(&lookup, "CADET_ROLE_ID")?),
            cadet_chat: ChannelId::new(required_id(&lookup, "CADET_CHAT_ID")?),
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn required_id<F>(lookup: &F, name: &'static str) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required(lookup, name)?;
    match value.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ConfigError::InvalidId { name, value }),
    }
}
