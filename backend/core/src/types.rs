use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake_id!(
    /// A member of the monitored space.
    MemberId
);
snowflake_id!(
    /// Platform message id of an announcement. Ids grow with creation time.
    AnnouncementId
);
snowflake_id!(ChannelId);
snowflake_id!(
    /// The space (guild) that owns the monitored channel.
    SpaceId
);

/// An announcement posted in the monitored channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub channel_id: ChannelId,
    pub space_id: Option<SpaceId>,
    pub created_at: DateTime<Utc>,
    /// Jump link shown in reminders. `channel_id` + `id` re-fetch the live acknowledgment set.
    pub link: String,
    #[serde(default)]
    pub author_bot: bool,
}

/// Identifies one tracking unit: a member's acknowledgment of one announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AckKey {
    pub member: MemberId,
    pub announcement: AnnouncementId,
}

impl AckKey {
    pub fn new(member: MemberId, announcement: AnnouncementId) -> Self {
        Self {
            member,
            announcement,
        }
    }
}

impl fmt::Display for AckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.member, self.announcement)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckStatus {
    pub missed_count: u32,
    pub moderator_notified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub bot: bool,
    #[serde(default)]
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bot: false,
            name: name.into(),
        }
    }

    pub fn bot(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            bot: true,
            ..Self::new(id, name)
        }
    }
}

/// A reference delivered by the platform that may carry only an id.
///
/// Fields are never read off a `Partial`; it must be resolved through an
/// explicit fetch into the full record first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref<I, T> {
    Partial(I),
    Full(T),
}

pub type MemberRef = Ref<MemberId, Member>;
pub type AnnouncementRef = Ref<AnnouncementId, Announcement>;

impl MemberRef {
    pub fn id(&self) -> MemberId {
        match self {
            Ref::Partial(id) => *id,
            Ref::Full(member) => member.id,
        }
    }
}

impl AnnouncementRef {
    pub fn id(&self) -> AnnouncementId {
        match self {
            Ref::Partial(id) => *id,
            Ref::Full(announcement) => announcement.id,
        }
    }
}

/// Mention syntax used in every message the bot dispatches.
pub fn mention(member: MemberId) -> String {
    format!("<@{member}>")
}

/// Form an acknowledgment marker is compared in. Custom emoji written as
/// `<:name:id>` or `<a:name:id>` reduce to `name`; anything else is unchanged.
pub fn marker_name(marker: &str) -> &str {
    let custom = marker
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|inner| {
            let mut parts = inner.splitn(3, ':');
            let (flag, name, id) = (parts.next()?, parts.next()?, parts.next()?);
            let valid = matches!(flag, "" | "a")
                && !name.is_empty()
                && !id.is_empty()
                && id.bytes().all(|b| b.is_ascii_digit());
            valid.then_some(name)
        });
    custom.unwrap_or(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_key_display_matches_member_then_announcement() {
        let key = AckKey::new(MemberId(7), AnnouncementId(42));
        assert_eq!(key.to_string(), "7-42");
    }

    #[test]
    fn ref_id_without_resolution() {
        let partial: MemberRef = Ref::Partial(MemberId(3));
        assert_eq!(partial.id(), MemberId(3));

        let full: MemberRef = Ref::Full(Member::bot(4u64, "helper"));
        assert_eq!(full.id(), MemberId(4));
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&AnnouncementId(99)).unwrap();
        assert_eq!(json, "99");
    }

    #[test]
    fn marker_name_reduces_custom_emoji() {
        assert_eq!(marker_name("✅"), "✅");
        assert_eq!(marker_name("<:ack:123456789012345678>"), "ack");
        assert_eq!(marker_name("<a:ack:123456789012345678>"), "ack");
        assert_eq!(marker_name("ack"), "ack");
        assert_eq!(marker_name("<:ack:notanid>"), "<:ack:notanid>");
        assert_eq!(marker_name("<@12>"), "<@12>");
    }

    #[test]
    fn mention_format() {
        assert_eq!(mention(MemberId(12)), "<@12>");
    }
}
