//! Platform identifier newtypes.
//!
//! The chat platform hands out stable numeric identities for guilds, members,
//! roles, and channels. Keeping them as distinct newtypes stops a role id from
//! being passed where a channel id is expected.

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype!(
    /// A guild (server) identity.
    GuildId
);
id_newtype!(
    /// A member/user identity, stable across guilds.
    UserId
);
id_newtype!(
    /// A role identity within a guild.
    RoleId
);
id_newtype!(
    /// A channel identity, used only as a message-send destination.
    ChannelId
);
