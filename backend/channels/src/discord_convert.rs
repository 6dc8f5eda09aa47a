//! Mapping between serenity models and ackwatch types.

use ackwatch_core::{
    AckEvent, Announcement, AnnouncementId, ChannelId, Member, MemberId, Ref, SpaceId,
};
use chrono::{DateTime, Utc};
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::guild::Member as GuildMember;
use serenity::model::user::User;

/// Jump link for a message. Direct messages have no guild and use `@me`.
pub fn message_link(space: Option<SpaceId>, channel: ChannelId, id: AnnouncementId) -> String {
    match space {
        Some(space) => format!("https://discord.com/channels/{space}/{channel}/{id}"),
        None => format!("https://discord.com/channels/@me/{channel}/{id}"),
    }
}

/// REST messages carry no guild id, so the caller may supply the channel's.
pub fn announcement_from(msg: &Message, fallback_space: Option<SpaceId>) -> Announcement {
    let id = AnnouncementId(msg.id.get());
    let channel_id = ChannelId(msg.channel_id.get());
    let space_id = msg.guild_id.map(|g| SpaceId(g.get())).or(fallback_space);
    Announcement {
        id,
        channel_id,
        space_id,
        created_at: DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0)
            .unwrap_or_else(Utc::now),
        link: message_link(space_id, channel_id, id),
        author_bot: msg.author.bot,
    }
}

pub fn member_from_user(user: &User) -> Member {
    Member {
        id: MemberId(user.id.get()),
        bot: user.bot,
        name: user.name.clone(),
    }
}

pub fn member_from_guild(member: &GuildMember) -> Member {
    Member {
        name: member.display_name().to_string(),
        ..member_from_user(&member.user)
    }
}

/// Marker as the engine compares it: the unicode symbol, or a custom emoji's name.
pub fn marker_of(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(symbol) => symbol.clone(),
        ReactionType::Custom { name: Some(name), .. } => name.clone(),
        other => other.to_string(),
    }
}

/// Reaction to enumerate for a configured marker. Accepts `<:name:id>` for custom emoji.
pub fn reaction_type(marker: &str) -> ReactionType {
    ReactionType::try_from(marker).unwrap_or_else(|_| ReactionType::Unicode(marker.to_string()))
}

/// Gateway reaction payloads only guarantee the user id; the engine resolves the rest.
pub fn ack_event(reaction: &Reaction) -> Option<AckEvent> {
    let user = reaction.user_id?;
    Some(AckEvent {
        channel_id: ChannelId(reaction.channel_id.get()),
        member: Ref::Partial(MemberId(user.get())),
        announcement: AnnouncementId(reaction.message_id.get()),
        marker: marker_of(&reaction.emoji),
    })
}
