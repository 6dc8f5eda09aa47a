//! In-memory platform for engine tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ackwatch_core::{
    AckError, AckResult, Announcement, AnnouncementId, ChannelId, EngineMessage, Member, MemberId,
    Platform, SpaceId,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use crate::engine::Engine;
use crate::settings::EngineSettings;

pub const ANNOUNCEMENTS: ChannelId = ChannelId(100);
pub const STAFF: ChannelId = ChannelId(200);
pub const MODERATOR: MemberId = MemberId(999);
pub const SPACE: SpaceId = SpaceId(1);

#[derive(Default)]
struct State {
    messages: BTreeMap<AnnouncementId, Announcement>,
    acks: HashMap<AnnouncementId, HashSet<MemberId>>,
    members: Vec<Member>,
    failing_acks: HashSet<AnnouncementId>,
    failing_history: bool,
    failing_members: bool,
    failing_staff: bool,
    blocked_dms: HashSet<MemberId>,
    direct: Vec<(MemberId, String)>,
    channel: Vec<(ChannelId, String)>,
    rejected: Vec<String>,
    suspended: Vec<(MemberId, Duration)>,
    lifted: Vec<MemberId>,
    acknowledger_fetches: usize,
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
}

pub fn announcement(id: u64) -> Announcement {
    Announcement {
        id: AnnouncementId(id),
        channel_id: ANNOUNCEMENTS,
        space_id: Some(SPACE),
        created_at: Utc::now(),
        link: format!("https://discord.com/channels/1/100/{id}"),
        author_bot: false,
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn post(&self, announcement: Announcement) {
        self.with(|s| {
            s.messages.insert(announcement.id, announcement);
        });
    }

    pub fn delete(&self, id: u64) {
        self.with(|s| {
            s.messages.remove(&AnnouncementId(id));
        });
    }

    pub fn add_member(&self, member: Member) {
        self.with(|s| s.members.push(member));
    }

    pub fn acknowledge(&self, member: u64, announcement: u64) {
        self.with(|s| {
            s.acks
                .entry(AnnouncementId(announcement))
                .or_default()
                .insert(MemberId(member));
        });
    }

    pub fn unacknowledge(&self, member: u64, announcement: u64) {
        self.with(|s| {
            if let Some(set) = s.acks.get_mut(&AnnouncementId(announcement)) {
                set.remove(&MemberId(member));
            }
        });
    }

    pub fn fail_acknowledgers(&self, announcement: u64) {
        self.with(|s| {
            s.failing_acks.insert(AnnouncementId(announcement));
        });
    }

    pub fn fail_history(&self, fail: bool) {
        self.with(|s| s.failing_history = fail);
    }

    pub fn fail_members(&self, fail: bool) {
        self.with(|s| s.failing_members = fail);
    }

    pub fn fail_staff(&self, fail: bool) {
        self.with(|s| s.failing_staff = fail);
    }

    pub fn block_dms(&self, member: u64) {
        self.with(|s| {
            s.blocked_dms.insert(MemberId(member));
        });
    }

    pub fn direct(&self) -> Vec<(MemberId, String)> {
        self.with(|s| s.direct.clone())
    }

    pub fn staff_posts(&self) -> Vec<String> {
        self.with(|s| s.channel.iter().map(|(_, text)| text.clone()).collect())
    }

    /// Channel posts the fake refused while `fail_staff` was on.
    pub fn rejected_staff_posts(&self) -> Vec<String> {
        self.with(|s| s.rejected.clone())
    }

    pub fn suspended(&self) -> Vec<(MemberId, Duration)> {
        self.with(|s| s.suspended.clone())
    }

    pub fn lifted(&self) -> Vec<MemberId> {
        self.with(|s| s.lifted.clone())
    }

    pub fn acknowledger_fetches(&self) -> usize {
        self.with(|s| s.acknowledger_fetches)
    }

    pub fn clear_outbox(&self) {
        self.with(|s| {
            s.direct.clear();
            s.channel.clear();
        });
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch_channel_messages(
        &self,
        channel: ChannelId,
        before: Option<AnnouncementId>,
        limit: u8,
    ) -> AckResult<Vec<Announcement>> {
        self.with(|s| {
            if s.failing_history {
                return Err(AckError::fetch(format!("history of {channel}"), "503 Service Unavailable"));
            }
            Ok(s.messages
                .values()
                .rev()
                .filter(|a| a.channel_id == channel)
                .filter(|a| before.is_none_or(|b| a.id < b))
                .take(limit as usize)
                .cloned()
                .collect())
        })
    }

    async fn fetch_announcement(
        &self,
        _channel: ChannelId,
        id: AnnouncementId,
    ) -> AckResult<Announcement> {
        self.with(|s| {
            s.messages
                .get(&id)
                .cloned()
                .ok_or_else(|| AckError::fetch(format!("message {id}"), "Unknown Message"))
        })
    }

    async fn fetch_acknowledgers(
        &self,
        announcement: &Announcement,
        _marker: &str,
    ) -> AckResult<HashSet<MemberId>> {
        self.with(|s| {
            s.acknowledger_fetches += 1;
            if s.failing_acks.contains(&announcement.id) || !s.messages.contains_key(&announcement.id) {
                return Err(AckError::fetch(
                    format!("acknowledgers of {}", announcement.id),
                    "Unknown Message",
                ));
            }
            Ok(s.acks.get(&announcement.id).cloned().unwrap_or_default())
        })
    }

    async fn fetch_members(&self, _space: SpaceId) -> AckResult<Vec<Member>> {
        self.with(|s| {
            if s.failing_members {
                return Err(AckError::fetch("members", "timeout"));
            }
            Ok(s.members.clone())
        })
    }

    async fn fetch_member(&self, id: MemberId) -> AckResult<Member> {
        self.with(|s| {
            s.members
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .ok_or_else(|| AckError::fetch(format!("member {id}"), "Unknown Member"))
        })
    }

    async fn send_direct(&self, member: MemberId, text: &str) -> AckResult<()> {
        self.with(|s| {
            if s.blocked_dms.contains(&member) {
                return Err(AckError::delivery(format!("member {member}"), "Cannot send messages to this user"));
            }
            s.direct.push((member, text.to_string()));
            Ok(())
        })
    }

    async fn send_to_channel(&self, channel: ChannelId, text: &str) -> AckResult<()> {
        self.with(|s| {
            if s.failing_staff {
                s.rejected.push(text.to_string());
                return Err(AckError::delivery(format!("channel {channel}"), "Missing Access"));
            }
            s.channel.push((channel, text.to_string()));
            Ok(())
        })
    }

    async fn suspend_member(
        &self,
        _space: SpaceId,
        member: MemberId,
        duration: Duration,
        _reason: &str,
    ) -> AckResult<()> {
        self.with(|s| s.suspended.push((member, duration)));
        Ok(())
    }

    async fn lift_suspension(&self, _space: SpaceId, member: MemberId) -> AckResult<()> {
        self.with(|s| s.lifted.push(member));
        Ok(())
    }
}

pub fn settings(threshold: u32) -> EngineSettings {
    EngineSettings {
        threshold,
        ..EngineSettings::new(ANNOUNCEMENTS, STAFF, MODERATOR)
    }
}

/// Engine wired to a fresh fake; the receiver gets lift-task reports.
pub fn engine(
    settings: EngineSettings,
) -> (Engine, Arc<FakePlatform>, mpsc::Receiver<EngineMessage>) {
    let platform = Arc::new(FakePlatform::new());
    let (tx, rx) = mpsc::channel(16);
    let engine = Engine::new(settings, platform.clone(), tx);
    (engine, platform, rx)
}

/// Engine whose store and fake channel both hold `announcements`, with
/// `members` as the human population.
pub fn seeded(
    settings: EngineSettings,
    announcements: &[u64],
    members: &[u64],
) -> (Engine, Arc<FakePlatform>, mpsc::Receiver<EngineMessage>) {
    let (mut engine, platform, rx) = engine(settings);
    for id in announcements {
        platform.post(announcement(*id));
        engine.ledger.store.upsert(announcement(*id));
    }
    for id in members {
        platform.add_member(Member::new(*id, format!("member-{id}")));
    }
    (engine, platform, rx)
}
