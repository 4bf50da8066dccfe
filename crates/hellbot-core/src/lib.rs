//! Foundational identifiers, configuration, and time helpers shared across
//! Hellbot crates.

pub mod config;
pub mod ids;
pub mod time_utils;

pub use config::{BotConfig, ConfigError};
pub use ids::{ChannelId, GuildId, RoleId, UserId};
pub use time_utils::utc_timestamp_iso8601;
