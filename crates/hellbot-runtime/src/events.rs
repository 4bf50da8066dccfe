//! Typed guild lifecycle events.

use hellbot_core::GuildId;
use hellbot_gateway::MemberProfile;

/// One platform event occurrence, as delivered to the router.
///
/// Delivery is at-least-once and unordered across event kinds; handlers must
/// tolerate re-delivery.
#[derive(Debug, Clone)]
pub enum GuildEvent {
    MemberJoined(MemberProfile),
    MemberLeft(MemberProfile),
    MemberUpdated {
        before: MemberProfile,
        after: MemberProfile,
    },
    /// The platform connection became ready; carries every guild the process
    /// is a member of.
    Ready { guild_ids: Vec<GuildId> },
}

impl GuildEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MemberJoined(_) => "member_joined",
            Self::MemberLeft(_) => "member_left",
            Self::MemberUpdated { .. } => "member_updated",
            Self::Ready { .. } => "ready",
        }
    }
}
