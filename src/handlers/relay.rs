//! The image → question → answer → translation exchange, independent of Telegram.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::types::{MessageId, UserId};
use thiserror::Error;

use crate::bot_state::ConversationStore;
use crate::handlers::utils::{
    CANCELLED, ENGLISH_HEADING, GEORGIAN_HEADING, IMAGE_RECEIVED, NOTHING_TO_CANCEL, PROCESSING,
    REQUEST_DISCARDED, REQUEST_FAILED, SEND_IMAGE_FIRST, SOLUTION_COMPLETE, TRANSLATING,
    TRANSLATION_FAILED,
};
use crate::llm::{LlmError, Translator, VisionReasoner};
use crate::math_text::normalize;
use crate::models::{ConversationPhase, PendingImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    /// Lightweight markup: `*bold*` and ```` ``` ```` fixed-width spans.
    Markdown,
}

#[derive(Debug, Error)]
#[error("failed to deliver message: {0}")]
pub struct DeliveryError(pub String);

/// Outbound side of one conversation.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, text: &str, format: TextFormat) -> Result<MessageId, DeliveryError>;

    async fn edit(&self, message: MessageId, text: &str) -> Result<(), DeliveryError>;

    async fn typing(&self) {}
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("question received without a pending image")]
    NoPendingImage,
    #[error("analysis failed: {0}")]
    Analysis(#[source] LlmError),
    #[error("translation failed: {0}")]
    Translation(#[source] LlmError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl RelayError {
    fn user_notice(&self) -> &'static str {
        match self {
            RelayError::NoPendingImage => SEND_IMAGE_FIRST,
            RelayError::Translation(_) => TRANSLATION_FAILED,
            RelayError::Analysis(_) | RelayError::Delivery(_) => REQUEST_FAILED,
        }
    }
}

enum Flow {
    Completed { status: MessageId },
    /// The user cancelled while the providers were working.
    Discarded { status: MessageId },
}

#[derive(Clone)]
pub struct Relay {
    store: Arc<dyn ConversationStore>,
    vision: Arc<dyn VisionReasoner>,
    translator: Arc<dyn Translator>,
}

impl Relay {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        vision: Arc<dyn VisionReasoner>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            store,
            vision,
            translator,
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub async fn on_image(
        &self,
        user: UserId,
        image: Vec<u8>,
        chat: &dyn Messenger,
    ) -> Result<(), DeliveryError> {
        let previous = self.store.phase(user).await;
        let size = image.len();
        let stored = self.store.put_image(user, image).await;
        if previous == ConversationPhase::AwaitingQuestion {
            log::info!(
                "🖼 Image #{} ({} bytes) replaces the pending image of user {}",
                stored.ticket,
                size,
                user
            );
        } else {
            log::info!(
                "🖼 Image #{} ({} bytes) stored for user {}",
                stored.ticket,
                size,
                user
            );
        }

        chat.send(IMAGE_RECEIVED, TextFormat::Plain).await?;
        Ok(())
    }

    pub async fn on_cancel(&self, user: UserId, chat: &dyn Messenger) -> Result<(), DeliveryError> {
        if self.store.clear(user).await {
            log::info!("🛑 User {} cancelled their pending image", user);
            chat.send(CANCELLED, TextFormat::Plain).await?;
        } else {
            chat.send(NOTHING_TO_CANCEL, TextFormat::Plain).await?;
        }
        Ok(())
    }

    /// Answers `question` about the user's pending image. Provider failures end up as
    /// a notice in the chat; only a failure to reach the chat itself is returned.
    pub async fn on_question(
        &self,
        user: UserId,
        question: &str,
        chat: &dyn Messenger,
    ) -> Result<(), DeliveryError> {
        match self.answer(user, question, chat).await {
            Ok(()) => Ok(()),
            Err(RelayError::NoPendingImage) => {
                log::warn!("❔ Question from user {} without an image", user);
                chat.send(SEND_IMAGE_FIRST, TextFormat::Plain).await?;
                Ok(())
            }
            Err(err) => {
                log::error!("❌ Error processing question from user {}: {}", user, err);
                chat.send(err.user_notice(), TextFormat::Plain).await?;
                Ok(())
            }
        }
    }

    async fn answer(
        &self,
        user: UserId,
        question: &str,
        chat: &dyn Messenger,
    ) -> Result<(), RelayError> {
        let image = self
            .store
            .get_image(user)
            .await
            .ok_or(RelayError::NoPendingImage)?;
        log::info!(
            "❓ Question from user {} about image #{}",
            user,
            image.ticket
        );

        // Anything but a cancellation ends the exchange for this snapshot,
        // including a chat that cannot be reached.
        let outcome = self.solve(user, &image, question, chat).await;
        if !matches!(outcome, Ok(Flow::Discarded { .. })) {
            self.store.clear_if_current(user, image.ticket).await;
        }

        match outcome? {
            Flow::Completed { status } => set_status(chat, status, SOLUTION_COMPLETE).await,
            Flow::Discarded { status } => set_status(chat, status, REQUEST_DISCARDED).await,
        }
        Ok(())
    }

    async fn solve(
        &self,
        user: UserId,
        image: &PendingImage,
        question: &str,
        chat: &dyn Messenger,
    ) -> Result<Flow, RelayError> {
        let status = chat.send(PROCESSING, TextFormat::Plain).await?;
        chat.typing().await;

        let english = self
            .vision
            .analyze(&image.bytes, question)
            .await
            .map_err(RelayError::Analysis)?;

        if self.cancelled(user, image).await {
            return Ok(Flow::Discarded { status });
        }
        chat.send(
            &format!("{ENGLISH_HEADING}\n\n{}", normalize(&english)),
            TextFormat::Markdown,
        )
        .await?;
        log::info!("💬 English solution sent to user {}", user);

        set_status(chat, status, TRANSLATING).await;
        chat.typing().await;

        // The translator gets the raw answer so it sees the notation the model wrote.
        let georgian = self
            .translator
            .translate(&english)
            .await
            .map_err(RelayError::Translation)?;

        if self.cancelled(user, image).await {
            return Ok(Flow::Discarded { status });
        }
        chat.send(
            &format!("{GEORGIAN_HEADING}\n\n{}", normalize(&georgian)),
            TextFormat::Markdown,
        )
        .await?;
        log::info!("💬 Georgian solution sent to user {}", user);

        Ok(Flow::Completed { status })
    }

    /// A newer image does not stop the answer about the snapshot; only `/cancel` does.
    async fn cancelled(&self, user: UserId, image: &PendingImage) -> bool {
        match self.store.get_image(user).await {
            None => {
                log::warn!(
                    "🗑 Discarding result for user {}: image #{} was cancelled",
                    user,
                    image.ticket
                );
                true
            }
            Some(current) => {
                if current.ticket != image.ticket {
                    log::debug!(
                        "Image #{} of user {} was replaced by #{}, answering anyway",
                        image.ticket,
                        user,
                        current.ticket
                    );
                }
                false
            }
        }
    }
}

async fn set_status(chat: &dyn Messenger, status: MessageId, text: &str) {
    if let Err(e) = chat.edit(status, text).await {
        log::warn!("Could not update status message: {}", e);
    }
}
