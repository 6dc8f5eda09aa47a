use std::fmt;

use crate::types::{AnnouncementId, AnnouncementRef, ChannelId, MemberRef};

/// Events delivered by the platform adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The gateway session is up; triggers the startup reconciliation.
    Ready,
    AnnouncementCreated {
        channel_id: ChannelId,
        announcement: AnnouncementRef,
    },
    AcknowledgeAdded(AckEvent),
    AcknowledgeRemoved(AckEvent),
    AnnouncementDeleted {
        channel_id: ChannelId,
        announcement: AnnouncementId,
    },
}

/// A marker applied to, or taken off, a message.
#[derive(Debug, Clone, PartialEq)]
pub struct AckEvent {
    pub channel_id: ChannelId,
    pub member: MemberRef,
    pub announcement: AnnouncementId,
    /// The marker symbol as the platform reports it (unicode emoji or custom name).
    pub marker: String,
}

/// Categories of platform events, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ready,
    AnnouncementCreated,
    AcknowledgeAdded,
    AcknowledgeRemoved,
    AnnouncementDeleted,
}

impl PlatformEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlatformEvent::Ready => EventKind::Ready,
            PlatformEvent::AnnouncementCreated { .. } => EventKind::AnnouncementCreated,
            PlatformEvent::AcknowledgeAdded(_) => EventKind::AcknowledgeAdded,
            PlatformEvent::AcknowledgeRemoved(_) => EventKind::AcknowledgeRemoved,
            PlatformEvent::AnnouncementDeleted { .. } => EventKind::AnnouncementDeleted,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Ready => "ready",
            EventKind::AnnouncementCreated => "announcement_created",
            EventKind::AcknowledgeAdded => "acknowledge_added",
            EventKind::AcknowledgeRemoved => "acknowledge_removed",
            EventKind::AnnouncementDeleted => "announcement_deleted",
        };
        f.write_str(s)
    }
}
