use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

mod bot_state;
mod config;
mod handlers;
mod llm;
mod math_text;
mod models;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::handlers::{command_handler, message_handler, photo_handler, Relay};
use crate::llm::{TranslationClient, VisionClient};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show usage instructions")]
    Help,
    #[command(description = "cancel the current operation")]
    Cancel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("🤖 Math Analysis Bot is starting...");

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        e
    })?;

    let vision = VisionClient::new(config.vision.clone())?;
    let translator = TranslationClient::new(config.translation.clone())?;
    let relay = Relay::new(
        Arc::new(BotState::new()),
        Arc::new(vision),
        Arc::new(translator),
    );
    log::info!(
        "✅ Providers ready: vision {}, translation {}",
        config.vision.model,
        config.translation.model
    );

    if let Some(ttl) = config.pending_image_ttl {
        let relay = relay.clone();
        tokio::spawn(async move {
            handlers::sweep_pending_images_task(relay, ttl).await;
        });
    }

    let bot = Bot::new(config.telegram_token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Could not register bot commands: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.photo().is_some())
                .endpoint(photo_handler),
        )
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
