use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;
use std::error::Error;

use crate::handlers::relay::{Messenger, Relay, TextFormat};
use crate::handlers::telegram::TelegramChat;
use crate::handlers::utils::{sender, IMAGE_FAILED, UNSUPPORTED_MESSAGE};

pub async fn photo_handler(
    bot: Bot,
    msg: Message,
    relay: Relay,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = sender(&msg) else {
        log::debug!("Photo without a sender in chat {}", msg.chat.id);
        return Ok(());
    };
    let chat = TelegramChat::new(bot.clone(), msg.chat.id);

    // Telegram sends several resolutions of the same photo.
    let Some(photo) = msg
        .photo()
        .and_then(|sizes| sizes.iter().max_by_key(|size| size.file.size))
    else {
        return Ok(());
    };

    match download_photo(&bot, photo).await {
        Ok(bytes) => relay.on_image(user, bytes, &chat).await?,
        Err(e) => {
            log::error!("❌ Error downloading image from user {}: {}", user, e);
            chat.send(IMAGE_FAILED, TextFormat::Plain).await?;
        }
    }
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    relay: Relay,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = sender(&msg) else {
        log::debug!("Message without a sender in chat {}", msg.chat.id);
        return Ok(());
    };
    let chat = TelegramChat::new(bot, msg.chat.id);

    match msg.text() {
        // Unknown commands; the known ones never reach this handler.
        Some(text) if text.starts_with('/') => {}
        Some(question) => relay.on_question(user, question, &chat).await?,
        None => {
            chat.send(UNSUPPORTED_MESSAGE, TextFormat::Plain).await?;
        }
    }
    Ok(())
}

async fn download_photo(
    bot: &Bot,
    photo: &PhotoSize,
) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;
    Ok(bytes)
}
