//! Texts of every message the bot sends.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

use ackwatch_core::{mention, Announcement, AnnouncementId, MemberId};
use chrono::{DateTime, Utc};

fn bullets<'a>(links: impl IntoIterator<Item = &'a str>) -> String {
    links
        .into_iter()
        .map(|link| format!("• {link}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn mentions(members: &[MemberId]) -> String {
    members.iter().map(|m| mention(*m)).collect::<Vec<_>>().join(", ")
}

/// One direct message covering every announcement the member has not acknowledged.
pub fn reminder(member: MemberId, pending: &[Announcement], marker: &str) -> String {
    format!(
        "Hello, {}!\n\nPlease check the following announcements:\n{}\n\nReact with {marker} to confirm your attendance.",
        mention(member),
        bullets(pending.iter().map(|a| a.link.as_str())),
    )
}

/// One staff-channel alert covering every pair that crossed the threshold this sweep.
pub fn moderator_alert(
    moderator: MemberId,
    escalations: &BTreeMap<MemberId, Vec<Announcement>>,
) -> String {
    let mut text = format!(
        "Hi {}!\nThe following members have unconfirmed announcements:\n\n",
        mention(moderator)
    );
    for (member, announcements) in escalations {
        let _ = writeln!(text, "{}:", mention(*member));
        let _ = write!(text, "{}\n\n", bullets(announcements.iter().map(|a| a.link.as_str())));
    }
    text.trim_end().to_string()
}

pub fn resolution_batch(members: &[MemberId]) -> String {
    format!(
        "The following members have now confirmed all flagged announcements: {}",
        mentions(members)
    )
}

pub fn resolved(member: MemberId, link: Option<&str>) -> String {
    match link {
        Some(link) => format!("{} has confirmed {link}", mention(member)),
        None => format!("{} has confirmed a flagged announcement", mention(member)),
    }
}

pub fn reopened(member: MemberId, link: Option<&str>, marker: &str) -> String {
    match link {
        Some(link) => format!("{} removed their {marker} from {link}; tracking restarted", mention(member)),
        None => format!("{} removed their {marker} from a flagged announcement; tracking restarted", mention(member)),
    }
}

pub fn deletion(announcement: AnnouncementId, members: &[MemberId]) -> String {
    format!(
        "Announcement {announcement} was deleted; dropped pending alerts for {}",
        mentions(members)
    )
}

pub fn suspended(member: MemberId, duration: Duration, until: DateTime<Utc>) -> String {
    format!(
        "{} has been suspended for {} minute(s) (until {}) after repeatedly missing announcements",
        mention(member),
        duration.as_secs().div_ceil(60),
        until.format("%Y-%m-%d %H:%M UTC"),
    )
}
