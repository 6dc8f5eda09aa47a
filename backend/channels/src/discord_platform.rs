//! REST side of the Discord integration.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ackwatch_core::{
    AckError, AckResult, Announcement, AnnouncementId, ChannelId, Member, MemberId, Platform,
    SpaceId,
};
use async_trait::async_trait;
use chrono::Utc;
use serenity::builder::{CreateMessage, EditMember, GetMessages};
use serenity::http::Http;
use serenity::model::id::{
    ChannelId as DiscordChannelId, GuildId, MessageId, UserId,
};
use tracing::{debug, info};

use crate::discord_convert::{announcement_from, member_from_guild, member_from_user, reaction_type};

/// Discord caps reaction-user pages at 100 and member pages at 1000.
const REACTION_PAGE: u8 = 100;
const MEMBER_PAGE: u64 = 1000;

pub struct DiscordPlatform {
    http: Arc<Http>,
    /// Guild of each channel seen so far. History pages do not carry it.
    spaces: Mutex<HashMap<ChannelId, Option<SpaceId>>>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            spaces: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }

    fn cached_space(&self, channel: ChannelId) -> Option<Option<SpaceId>> {
        self.spaces
            .lock()
            .ok()
            .and_then(|spaces| spaces.get(&channel).copied())
    }

    async fn space_of(&self, channel: ChannelId) -> AckResult<Option<SpaceId>> {
        if let Some(space) = self.cached_space(channel) {
            return Ok(space);
        }
        let space = discord_channel(channel)
            .to_channel(&self.http)
            .await
            .map_err(|e| AckError::fetch(format!("channel {channel}"), e))?
            .guild()
            .map(|g| SpaceId(g.guild_id.get()));
        if let Ok(mut spaces) = self.spaces.lock() {
            spaces.insert(channel, space);
        }
        debug!(%channel, ?space, "Resolved channel guild");
        Ok(space)
    }
}

fn discord_channel(id: ChannelId) -> DiscordChannelId {
    DiscordChannelId::new(id.get())
}

fn guild(id: SpaceId) -> GuildId {
    GuildId::new(id.get())
}

fn user(id: MemberId) -> UserId {
    UserId::new(id.get())
}

#[async_trait]
impl Platform for DiscordPlatform {
    fn name(&self) -> &str {
        "discord"
    }

    async fn fetch_channel_messages(
        &self,
        channel: ChannelId,
        before: Option<AnnouncementId>,
        limit: u8,
    ) -> AckResult<Vec<Announcement>> {
        let space = self.space_of(channel).await?;
        let mut request = GetMessages::new().limit(limit);
        if let Some(before) = before {
            request = request.before(MessageId::new(before.get()));
        }
        let messages = discord_channel(channel)
            .messages(&self.http, request)
            .await
            .map_err(|e| AckError::fetch(format!("history of {channel}"), e))?;
        Ok(messages
            .iter()
            .map(|msg| announcement_from(msg, space))
            .collect())
    }

    async fn fetch_announcement(
        &self,
        channel: ChannelId,
        id: AnnouncementId,
    ) -> AckResult<Announcement> {
        let space = self.space_of(channel).await?;
        let msg = discord_channel(channel)
            .message(&self.http, MessageId::new(id.get()))
            .await
            .map_err(|e| AckError::fetch(format!("message {id}"), e))?;
        Ok(announcement_from(&msg, space))
    }

    async fn fetch_acknowledgers(
        &self,
        announcement: &Announcement,
        marker: &str,
    ) -> AckResult<HashSet<MemberId>> {
        let channel = discord_channel(announcement.channel_id);
        let message = MessageId::new(announcement.id.get());
        let reaction = reaction_type(marker);
        let mut acknowledgers = HashSet::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = channel
                .reaction_users(&self.http, message, reaction.clone(), Some(REACTION_PAGE), after)
                .await
                .map_err(|e| AckError::fetch(format!("acknowledgers of {}", announcement.id), e))?;
            let full = page.len() == REACTION_PAGE as usize;
            after = page.last().map(|u| u.id);
            acknowledgers.extend(page.iter().map(|u| MemberId(u.id.get())));
            if !full || after.is_none() {
                break;
            }
        }
        Ok(acknowledgers)
    }

    async fn fetch_members(&self, space: SpaceId) -> AckResult<Vec<Member>> {
        let mut members = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild(space)
                .members(&self.http, Some(MEMBER_PAGE), after)
                .await
                .map_err(|e| AckError::fetch(format!("members of {space}"), e))?;
            let full = page.len() as u64 == MEMBER_PAGE;
            after = page.last().map(|m| m.user.id);
            members.extend(page.iter().map(member_from_guild));
            if !full || after.is_none() {
                break;
            }
        }
        debug!(%space, count = members.len(), "Fetched member list");
        Ok(members)
    }

    async fn fetch_member(&self, id: MemberId) -> AckResult<Member> {
        user(id)
            .to_user(&self.http)
            .await
            .map(|u| member_from_user(&u))
            .map_err(|e| AckError::fetch(format!("member {id}"), e))
    }

    async fn send_direct(&self, member: MemberId, text: &str) -> AckResult<()> {
        user(member)
            .direct_message(&self.http, CreateMessage::new().content(text))
            .await
            .map(|_| ())
            .map_err(|e| AckError::delivery(format!("member {member}"), e))
    }

    async fn send_to_channel(&self, channel: ChannelId, text: &str) -> AckResult<()> {
        discord_channel(channel)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| AckError::delivery(format!("channel {channel}"), e))
    }

    async fn suspend_member(
        &self,
        space: SpaceId,
        member: MemberId,
        duration: Duration,
        reason: &str,
    ) -> AckResult<()> {
        let until = Utc::now()
            + chrono::Duration::from_std(duration)
                .map_err(|e| AckError::delivery(format!("member {member}"), e))?;
        let edit = EditMember::new()
            .disable_communication_until(until.to_rfc3339())
            .audit_log_reason(reason);
        guild(space)
            .edit_member(&self.http, user(member), edit)
            .await
            .map_err(|e| AckError::delivery(format!("member {member}"), e))?;
        info!(%space, %member, %until, "Timeout applied");
        Ok(())
    }

    async fn lift_suspension(&self, space: SpaceId, member: MemberId) -> AckResult<()> {
        guild(space)
            .edit_member(&self.http, user(member), EditMember::new().enable_communication())
            .await
            .map(|_| ())
            .map_err(|e| AckError::delivery(format!("member {member}"), e))
    }
}
