//! Full membership lifecycle driven through the router against in-memory
//! capability fakes: startup backfill, arrival, nickname change, promotion,
//! departure.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use hellbot_core::{ChannelId, GuildId, RoleId, UserId};
use hellbot_gateway::{
    ChannelInfo, ChatClient, MemberProfile, MemberRegistration, MonitorLog, RegistryStore,
    RoleAssignError, RoleAuthority, RoleInfo,
};
use hellbot_runtime::handlers::{
    ArrivalHandler, DepartureHandler, NicknameHandler, PromotionHandler, ReconcileHandler,
};
use hellbot_runtime::{EventRouter, GuildEvent};

const GUILD: GuildId = GuildId::new(300);
const WELCOME: ChannelId = ChannelId::new(200);
const MONITOR: ChannelId = ChannelId::new(201);
const KIA: ChannelId = ChannelId::new(203);
const CADET_CHAT: ChannelId = ChannelId::new(206);
const STANDARD_ROLE: RoleId = RoleId::new(100);
const CLASS_A_ROLE: RoleId = RoleId::new(101);
const CADET_ROLE: RoleId = RoleId::new(102);

struct InMemoryChat {
    channels: BTreeSet<ChannelId>,
    roles: BTreeMap<RoleId, String>,
    members: Mutex<Vec<MemberProfile>>,
    live_roles: Mutex<BTreeMap<UserId, BTreeSet<RoleId>>>,
    sent: Mutex<Vec<(ChannelId, String)>>,
    assigned: Mutex<Vec<(UserId, RoleId)>>,
}

impl InMemoryChat {
    fn new(members: Vec<MemberProfile>) -> Self {
        let live_roles = members
            .iter()
            .map(|member| (member.member_id, member.roles.clone()))
            .collect();
        Self {
            channels: BTreeSet::from([WELCOME, MONITOR, KIA, CADET_CHAT]),
            roles: BTreeMap::from([
                (STANDARD_ROLE, "Trooper".to_string()),
                (CLASS_A_ROLE, "Class A Citizen".to_string()),
                (CADET_ROLE, "Cadet".to_string()),
            ]),
            members: Mutex::new(members),
            live_roles: Mutex::new(live_roles),
            sent: Mutex::new(Vec::new()),
            assigned: Mutex::new(Vec::new()),
        }
    }

    fn messages_to(&self, channel: ChannelId) -> Vec<String> {
        self.sent
            .lock()
            .expect("sent lock")
            .iter()
            .filter(|(destination, _)| *destination == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn assignments(&self) -> Vec<(UserId, RoleId)> {
        self.assigned.lock().expect("assigned lock").clone()
    }
}

#[async_trait]
impl ChatClient for InMemoryChat {
    async fn find_channel(&self, channel: ChannelId) -> Result<Option<ChannelInfo>> {
        Ok(self.channels.contains(&channel).then(|| ChannelInfo {
            id: channel,
            name: format!("channel-{channel}"),
        }))
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.sent
            .lock()
            .expect("sent lock")
            .push((channel, text.to_string()));
        Ok(())
    }

    async fn find_role(&self, _guild: GuildId, role: RoleId) -> Result<Option<RoleInfo>> {
        Ok(self.roles.get(&role).map(|name| RoleInfo {
            id: role,
            name: name.clone(),
        }))
    }

    async fn assign_role(
        &self,
        _guild: GuildId,
        member: UserId,
        role: RoleId,
        _reason: &str,
    ) -> Result<(), RoleAssignError> {
        self.assigned
            .lock()
            .expect("assigned lock")
            .push((member, role));
        self.live_roles
            .lock()
            .expect("live roles lock")
            .entry(member)
            .or_default()
            .insert(role);
        Ok(())
    }

    async fn member_has_role(
        &self,
        _guild: GuildId,
        member: UserId,
        role: RoleId,
    ) -> Result<bool> {
        Ok(self
            .live_roles
            .lock()
            .expect("live roles lock")
            .get(&member)
            .is_some_and(|roles| roles.contains(&role)))
    }

    async fn list_members(&self, _guild: GuildId) -> Result<Vec<MemberProfile>> {
        Ok(self.members.lock().expect("members lock").clone())
    }

    async fn role_authority(&self, _guild: GuildId, _role: RoleId) -> Result<RoleAuthority> {
        Ok(RoleAuthority {
            can_manage_roles: true,
            ranks_above_target: true,
        })
    }
}

#[derive(Default)]
struct InMemoryStore {
    registrations: Mutex<Vec<MemberRegistration>>,
    missions: BTreeMap<UserId, i64>,
}

impl InMemoryStore {
    fn registrations(&self) -> Vec<MemberRegistration> {
        self.registrations.lock().expect("registrations lock").clone()
    }
}

#[async_trait]
impl RegistryStore for InMemoryStore {
    async fn upsert_registration(&self, registration: &MemberRegistration) -> Result<()> {
        let mut registrations = self.registrations.lock().expect("registrations lock");
        if let Some(existing) = registrations.iter_mut().find(|existing| {
            existing.discord_id == registration.discord_id
                && existing.discord_server_id == registration.discord_server_id
        }) {
            let registered_at = existing.registered_at.clone();
            *existing = registration.clone();
            existing.registered_at = registered_at;
        } else {
            registrations.push(registration.clone());
        }
        Ok(())
    }

    async fn update_display_name(
        &self,
        member: UserId,
        guild: GuildId,
        display_name: &str,
    ) -> Result<bool> {
        let mut registrations = self.registrations.lock().expect("registrations lock");
        match registrations.iter_mut().find(|existing| {
            existing.discord_id == member.to_string()
                && existing.discord_server_id == guild.to_string()
        }) {
            Some(existing) => {
                existing.server_nickname = display_name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn completed_missions(&self, user: UserId) -> Result<Option<i64>> {
        Ok(self.missions.get(&user).copied())
    }
}

fn profile(member: u64, username: &str, display_name: &str, roles: &[RoleId]) -> MemberProfile {
    MemberProfile {
        member_id: UserId::new(member),
        guild_id: GUILD,
        username: username.to_string(),
        display_name: display_name.to_string(),
        guild_name: "GPT Fleet".to_string(),
        is_bot: false,
        roles: roles.iter().copied().collect(),
    }
}

fn build_router(chat: Arc<InMemoryChat>, store: Arc<InMemoryStore>) -> EventRouter {
    let monitor = Arc::new(MonitorLog::new(chat.clone(), MONITOR));
    let mut router = EventRouter::new(monitor);
    router.register(Arc::new(DepartureHandler::new(chat.clone(), KIA)));
    router.register(Arc::new(NicknameHandler::new(store.clone())));
    router.register(Arc::new(PromotionHandler::new(
        chat.clone(),
        store.clone(),
        CADET_ROLE,
        CADET_CHAT,
        CLASS_A_ROLE,
        WELCOME,
    )));
    router.register(Arc::new(ArrivalHandler::new(
        chat.clone(),
        store.clone(),
        WELCOME,
        STANDARD_ROLE,
    )));
    router.register(Arc::new(ReconcileHandler::with_pace(
        chat,
        STANDARD_ROLE,
        Duration::ZERO,
    )));
    router
}

#[tokio::test]
async fn member_lifecycle_roundtrip() {
    let veterans = vec![
        profile(1, "alpha", "Alpha", &[]),
        profile(2, "bravo", "Bravo", &[STANDARD_ROLE]),
        MemberProfile {
            is_bot: true,
            ..profile(3, "helper-bot", "Helper Bot", &[])
        },
    ];
    let chat = Arc::new(InMemoryChat::new(veterans));
    let store = Arc::new(InMemoryStore {
        missions: BTreeMap::from([(UserId::new(9001), 0)]),
        ..InMemoryStore::default()
    });
    let router = build_router(chat.clone(), store.clone());

    // Startup backfill: Alpha lacks the role, Bravo already holds it, the bot
    // is excluded.
    router
        .dispatch(&GuildEvent::Ready {
            guild_ids: vec![GUILD],
        })
        .await;
    assert_eq!(chat.assignments(), vec![(UserId::new(1), STANDARD_ROLE)]);

    // A recruit arrives: welcome message, role, roster registration.
    let recruit = profile(9001, "rook_account", "Rook", &[]);
    router
        .dispatch(&GuildEvent::MemberJoined(recruit.clone()))
        .await;
    let welcome_messages = chat.messages_to(WELCOME);
    assert_eq!(welcome_messages.len(), 1);
    assert!(welcome_messages[0].contains("<@9001>"));
    assert_eq!(
        chat.assignments(),
        vec![
            (UserId::new(1), STANDARD_ROLE),
            (UserId::new(9001), STANDARD_ROLE),
        ]
    );
    assert_eq!(store.registrations().len(), 1);
    assert_eq!(store.registrations()[0].server_nickname, "Rook");

    // The recruit picks a new nickname.
    let renamed = profile(9001, "rook_account", "Rook Prime", &[STANDARD_ROLE]);
    router
        .dispatch(&GuildEvent::MemberUpdated {
            before: profile(9001, "rook_account", "Rook", &[STANDARD_ROLE]),
            after: renamed.clone(),
        })
        .await;
    assert_eq!(store.registrations()[0].server_nickname, "Rook Prime");

    // Promotion to class A announces even with zero completed missions.
    let promoted = profile(
        9001,
        "rook_account",
        "Rook Prime",
        &[STANDARD_ROLE, CLASS_A_ROLE],
    );
    router
        .dispatch(&GuildEvent::MemberUpdated {
            before: renamed,
            after: promoted.clone(),
        })
        .await;
    let welcome_messages = chat.messages_to(WELCOME);
    assert_eq!(welcome_messages.len(), 2);
    assert!(welcome_messages[1].contains("completing 0 missions"));

    // Departure: a goodbye line, and the roster entry survives.
    router.dispatch(&GuildEvent::MemberLeft(promoted)).await;
    let goodbyes = chat.messages_to(KIA);
    assert_eq!(goodbyes.len(), 1);
    assert!(goodbyes[0].starts_with("Rook Prime "));
    assert_eq!(store.registrations().len(), 1);

    // Nothing along the way needed the monitor channel.
    assert!(chat.messages_to(MONITOR).is_empty());
}
