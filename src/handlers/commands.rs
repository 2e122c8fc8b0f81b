use teloxide::prelude::*;
use std::error::Error;

use crate::handlers::relay::Relay;
use crate::handlers::telegram::TelegramChat;
use crate::handlers::utils::{sender, HELP_TEXT, WELCOME_TEXT};

use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    relay: Relay,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }
        Command::Cancel => handle_cancel(bot, msg, relay).await?,
    }
    Ok(())
}

async fn handle_cancel(
    bot: Bot,
    msg: Message,
    relay: Relay,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = sender(&msg) else {
        log::debug!("/cancel without a sender in chat {}", msg.chat.id);
        return Ok(());
    };

    let chat = TelegramChat::new(bot, msg.chat.id);
    relay.on_cancel(user, &chat).await?;
    Ok(())
}
