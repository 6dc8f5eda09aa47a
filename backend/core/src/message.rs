use crate::event::PlatformEvent;
use crate::types::MemberId;

/// Messages consumed by the engine's owning task.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Adapter → engine: something happened on the platform.
    Platform(PlatformEvent),
    /// Lift task → engine: a scheduled suspension lift ran; drop its record.
    /// `generation` identifies the suspension the task belonged to.
    SuspensionLifted {
        member: MemberId,
        generation: u64,
        lifted: bool,
    },
    /// Binary → engine: cancel outstanding timers and exit.
    Shutdown,
}

impl From<PlatformEvent> for EngineMessage {
    fn from(event: PlatformEvent) -> Self {
        EngineMessage::Platform(event)
    }
}
