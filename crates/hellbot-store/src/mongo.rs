//! Mongo client, index bootstrap, and the roster/statistics collections.
//!
//! The client is constructed once at bootstrap and shared via `Arc`; handlers
//! never open connections of their own.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database, IndexModel};

use hellbot_core::{GuildId, UserId};
use hellbot_gateway::{MemberRegistration, RegistryStore};

pub const DATABASE_NAME: &str = "GPTHellbot";
const ALLIANCE: &str = "Alliance";
const USER_STATS: &str = "User_Stats";
const SERVER_LISTING: &str = "Server_Listing";

const MISSIONS_FIELD: &str = "Completed_Missions";

/// Single-field indexes ensured at startup, per collection.
const INDEXES: &[(&str, &str)] = &[
    (USER_STATS, "server_nickname"),
    (ALLIANCE, "player_name"),
    (ALLIANCE, "discord_id"),
    (ALLIANCE, "discord_server_id"),
    (SERVER_LISTING, "discord_server_id"),
];

pub struct MongoRegistryStore {
    db: Database,
}

impl MongoRegistryStore {
    /// Connects to the document store. Called once during bootstrap, before
    /// the event loop starts.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("failed to connect to document store")?;
        Ok(Self {
            db: client.database(DATABASE_NAME),
        })
    }

    /// Ensures the single-field indexes the external read paths rely on.
    pub async fn ensure_indexes(&self) -> Result<()> {
        for (collection, field) in INDEXES {
            let mut keys = Document::new();
            keys.insert(*field, 1);
            let index = IndexModel::builder().keys(keys).build();
            self.db
                .collection::<Document>(collection)
                .create_index(index)
                .await
                .with_context(|| format!("failed to create index on {collection}.{field}"))?;
        }
        tracing::info!("document store indexes ensured");
        Ok(())
    }

    fn alliance(&self) -> Collection<Document> {
        self.db.collection(ALLIANCE)
    }

    fn user_stats(&self) -> Collection<Document> {
        self.db.collection(USER_STATS)
    }
}

fn registration_key(member: &str, guild: &str) -> Document {
    doc! { "discord_id": member, "discord_server_id": guild }
}

/// Reads the mission counter out of a statistics document, tolerating the
/// numeric type wobble of the external write path. A present document with a
/// missing counter reads as zero.
fn mission_count(document: &Document) -> i64 {
    match document.get(MISSIONS_FIELD) {
        Some(Bson::Int64(value)) => *value,
        Some(Bson::Int32(value)) => i64::from(*value),
        Some(Bson::Double(value)) => *value as i64,
        _ => 0,
    }
}

#[async_trait]
impl RegistryStore for MongoRegistryStore {
    async fn upsert_registration(&self, registration: &MemberRegistration) -> Result<()> {
        let filter = registration_key(&registration.discord_id, &registration.discord_server_id);
        let update = doc! {
            "$set": {
                "player_name": registration.player_name.as_str(),
                "server_name": registration.server_name.as_str(),
                "server_nickname": registration.server_nickname.as_str(),
            },
            // First write wins for the registration timestamp.
            "$setOnInsert": { "registered_at": registration.registered_at.as_str() },
        };
        self.alliance()
            .update_one(filter, update)
            .upsert(true)
            .await
            .context("failed to upsert roster registration")?;
        Ok(())
    }

    async fn update_display_name(
        &self,
        member: UserId,
        guild: GuildId,
        display_name: &str,
    ) -> Result<bool> {
        let filter = registration_key(&member.to_string(), &guild.to_string());
        let update = doc! { "$set": { "server_nickname": display_name } };
        let result = self
            .alliance()
            .update_one(filter, update)
            .await
            .context("failed to update roster nickname")?;
        Ok(result.matched_count > 0)
    }

    async fn completed_missions(&self, user: UserId) -> Result<Option<i64>> {
        let found = self
            .user_stats()
            .find_one(doc! { "user_id": user.to_string() })
            .await
            .context("failed to read user statistics")?;
        Ok(found.as_ref().map(mission_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_key_uses_composite_identity() {
        let key = registration_key("123", "456");
        assert_eq!(key.get_str("discord_id").expect("discord_id"), "123");
        assert_eq!(
            key.get_str("discord_server_id").expect("discord_server_id"),
            "456"
        );
    }

    #[test]
    fn mission_count_reads_integer_variants() {
        assert_eq!(mission_count(&doc! { MISSIONS_FIELD: 7_i64 }), 7);
        assert_eq!(mission_count(&doc! { MISSIONS_FIELD: 7_i32 }), 7);
        assert_eq!(mission_count(&doc! { MISSIONS_FIELD: 7.0_f64 }), 7);
    }

    #[test]
    fn missing_counter_reads_as_zero() {
        assert_eq!(mission_count(&doc! { "user_id": "1" }), 0);
        assert_eq!(mission_count(&doc! { MISSIONS_FIELD: "seven" }), 0);
    }
}
