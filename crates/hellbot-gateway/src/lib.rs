//! Capability interfaces for the two external systems the bot coordinates:
//! the chat platform and the document store, plus the dual-sink monitor
//! logger built on top of the chat capability.
//!
//! Handlers depend only on the traits in this crate; concrete clients live in
//! `hellbot-discord-runtime` and `hellbot-store`.

pub mod chat;
pub mod monitor;
pub mod store;

pub use chat::{
    ChannelInfo, ChatClient, MemberProfile, RoleAssignError, RoleAuthority, RoleInfo,
};
pub use monitor::MonitorLog;
pub use store::{MemberRegistration, RegistryStore};
