pub mod user_state;

pub use user_state::{ConversationPhase, PendingImage};
