use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AckResult;
use crate::types::{Announcement, AnnouncementId, ChannelId, Member, MemberId, SpaceId};

/// The chat platform the engine talks to.
///
/// Every call is a single attempt; the engine bounds each one with a timeout
/// and isolates failures per item.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Platform name for logging.
    fn name(&self) -> &str;

    /// One page of channel history, newest first, strictly older than `before`
    /// when given. An empty page means the history is exhausted.
    async fn fetch_channel_messages(
        &self,
        channel: ChannelId,
        before: Option<AnnouncementId>,
        limit: u8,
    ) -> AckResult<Vec<Announcement>>;

    /// Resolve a partial announcement reference into the full record.
    async fn fetch_announcement(
        &self,
        channel: ChannelId,
        id: AnnouncementId,
    ) -> AckResult<Announcement>;

    /// Current set of members who applied `marker` to the announcement.
    async fn fetch_acknowledgers(
        &self,
        announcement: &Announcement,
        marker: &str,
    ) -> AckResult<HashSet<MemberId>>;

    /// Full member population of a space, bots included.
    async fn fetch_members(&self, space: SpaceId) -> AckResult<Vec<Member>>;

    /// Resolve a partial member reference.
    async fn fetch_member(&self, id: MemberId) -> AckResult<Member>;

    async fn send_direct(&self, member: MemberId, text: &str) -> AckResult<()>;

    async fn send_to_channel(&self, channel: ChannelId, text: &str) -> AckResult<()>;

    async fn suspend_member(
        &self,
        space: SpaceId,
        member: MemberId,
        duration: Duration,
        reason: &str,
    ) -> AckResult<()>;

    async fn lift_suspension(&self, space: SpaceId, member: MemberId) -> AckResult<()>;
}
