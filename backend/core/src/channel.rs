use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::message::EngineMessage;

/// Default channel buffer size for adapter → engine messaging.
const DEFAULT_BUFFER_SIZE: usize = 256;

/// The bus connecting the platform adapter, lift timers and the binary to the
/// engine's owning task.
///
/// Senders are cloned freely; the single receiver is taken once by the engine.
pub struct AckBus {
    pub engine_tx: mpsc::Sender<EngineMessage>,
    engine_rx: Option<mpsc::Receiver<EngineMessage>>,
}

impl AckBus {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer: usize) -> Self {
        let (engine_tx, engine_rx) = mpsc::channel(buffer);
        info!(buffer_size = buffer, "AckBus initialized");
        Self {
            engine_tx,
            engine_rx: Some(engine_rx),
        }
    }

    /// Take the engine receiver (can only be called once).
    pub fn take_engine_rx(&mut self) -> Option<mpsc::Receiver<EngineMessage>> {
        debug!("Engine receiver taken");
        self.engine_rx.take()
    }
}

impl Default for AckBus {
    fn default() -> Self {
        Self::new()
    }
}
