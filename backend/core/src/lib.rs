pub mod channel;
pub mod error;
pub mod event;
pub mod ledger;
pub mod message;
pub mod store;
pub mod tracker;
pub mod traits;
pub mod types;

pub use channel::AckBus;
pub use error::{AckError, AckResult};
pub use event::{AckEvent, EventKind, PlatformEvent};
pub use ledger::{Ledger, LedgerStats, Removal};
pub use message::EngineMessage;
pub use store::AnnouncementStore;
pub use tracker::{AckTracker, MissOutcome};
pub use traits::Platform;
pub use types::{
    marker_name, mention, AckKey, AckStatus, Announcement, AnnouncementId, AnnouncementRef, ChannelId, Member,
    MemberId, MemberRef, Ref, SpaceId,
};
