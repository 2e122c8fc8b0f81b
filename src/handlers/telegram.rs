use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};

use crate::handlers::relay::{DeliveryError, Messenger, TextFormat};
use crate::handlers::utils::{split_message, TELEGRAM_MESSAGE_LIMIT};

/// Replies into one Telegram chat.
pub struct TelegramChat {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramChat {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    // A single unbalanced `*` or `_` makes Telegram refuse the whole message;
    // such messages go out again without markup.
    #[allow(deprecated)]
    async fn send_chunk(&self, text: &str, format: TextFormat) -> Result<Message, RequestError> {
        match format {
            TextFormat::Plain => self.bot.send_message(self.chat_id, text).await,
            TextFormat::Markdown => {
                match self
                    .bot
                    .send_message(self.chat_id, text)
                    .parse_mode(ParseMode::Markdown)
                    .await
                {
                    Err(RequestError::Api(ApiError::CantParseEntities(reason))) => {
                        log::warn!(
                            "⚠️ Markdown rejected in chat {} ({}), resending as plain text",
                            self.chat_id,
                            reason
                        );
                        self.bot.send_message(self.chat_id, text).await
                    }
                    other => other,
                }
            }
        }
    }
}

#[async_trait]
impl Messenger for TelegramChat {
    async fn send(&self, text: &str, format: TextFormat) -> Result<MessageId, DeliveryError> {
        let mut last = None;
        for chunk in split_message(text, TELEGRAM_MESSAGE_LIMIT) {
            let sent = self
                .send_chunk(&chunk, format)
                .await
                .map_err(|e| DeliveryError(e.to_string()))?;
            last = Some(sent.id);
        }
        last.ok_or_else(|| DeliveryError("nothing to send".to_string()))
    }

    async fn edit(&self, message: MessageId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .edit_message_text(self.chat_id, message, text)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError(e.to_string()))
    }

    async fn typing(&self) {
        let _ = self
            .bot
            .send_chat_action(self.chat_id, ChatAction::Typing)
            .await;
    }
}
