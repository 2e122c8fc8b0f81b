use std::sync::Arc;
use std::time::SystemTime;

/// Where a user is in the image → question exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationPhase {
    #[default]
    Idle,
    AwaitingQuestion,
}

/// The most recent image a user sent, held until a question consumes it.
#[derive(Debug, Clone)]
pub struct PendingImage {
    /// Increases with every stored image, so a snapshot can tell whether it was replaced.
    pub ticket: u64,
    pub bytes: Arc<[u8]>,
    pub received_at: SystemTime,
}
