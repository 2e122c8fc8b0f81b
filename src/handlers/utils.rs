use teloxide::types::{Message, UserId};

/// Telegram rejects messages above 4096 UTF-16 units; stay under that in chars.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

pub const WELCOME_TEXT: &str = "👋 Welcome to the Math Analysis Bot!\n\n\
    I can help you solve mathematical problems. Here's how to use me:\n\
    1. Send me an image of your math problem\n\
    2. Ask your question about the problem\n\
    3. I'll provide a detailed solution in both English and Georgian\n\n\
    Commands:\n\
    /start - Show this welcome message\n\
    /help - Get help information\n\
    /cancel - Cancel current operation";

pub const HELP_TEXT: &str = "🤖 Bot Usage Instructions:\n\n\
    1. Send an image of your math problem\n\
    2. After the image is received, ask your question\n\
    3. Wait for the analysis (this might take a few seconds)\n\
    4. Get step-by-step solutions in both English and Georgian\n\n\
    Tips for best results:\n\
    • Make sure the image is clear and readable\n\
    • Frame your question clearly\n\
    • Be specific about what you want to know\n\n\
    Commands:\n\
    /start - Start the bot\n\
    /help - Show this help message\n\
    /cancel - Cancel current operation";

pub const IMAGE_RECEIVED: &str = "Image received! 🖼\nNow, please ask your question about this math problem.";
pub const IMAGE_FAILED: &str = "Sorry, there was an error processing your image. Please try sending it again.";
pub const SEND_IMAGE_FIRST: &str = "Please send an image of your math problem first before asking a question.";
pub const UNSUPPORTED_MESSAGE: &str = "I can only read photos and text. Send an image of your problem, then ask your question.";

pub const PROCESSING: &str = "Processing your request... ⏳\nThis might take a few seconds.";
pub const TRANSLATING: &str = "English solution complete ✅\nNow translating to Georgian... ⏳";
pub const SOLUTION_COMPLETE: &str = "✅ Solution complete!";
pub const REQUEST_DISCARDED: &str = "⚠️ Request cancelled, the result was discarded.";

pub const ENGLISH_HEADING: &str = "🇬🇧 *English Solution:*";
pub const GEORGIAN_HEADING: &str = "🇬🇪 *ქართული ამოხსნა:*";

pub const REQUEST_FAILED: &str = "Sorry, there was an error processing your request. Please try again or send a new image.";
pub const TRANSLATION_FAILED: &str = "Sorry, the Georgian translation failed. The English solution above is complete; \
    send the image again if you need the translation.";

pub const CANCELLED: &str = "Operation cancelled. You can start again by sending a new image.";
pub const NOTHING_TO_CANCEL: &str = "No active operation to cancel.";

/// The user a message came from; channel posts have none.
pub fn sender(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(|user| user.id)
}

/// Splits `text` into chunks of at most `limit` chars, breaking between lines where possible.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        for piece in split_long_line(line, limit) {
            let piece_len = piece.chars().count();
            current = match current.take() {
                Some((mut chunk, len)) if len + 1 + piece_len <= limit => {
                    chunk.push('\n');
                    chunk.push_str(&piece);
                    Some((chunk, len + 1 + piece_len))
                }
                Some((chunk, _)) => {
                    chunks.push(chunk);
                    Some((piece, piece_len))
                }
                None => Some((piece, piece_len)),
            };
        }
    }

    if let Some((chunk, _)) = current {
        chunks.push(chunk);
    }
    chunks
}

fn split_long_line(line: &str, limit: usize) -> Vec<String> {
    if line.chars().count() <= limit {
        return vec![line.to_string()];
    }
    line.chars()
        .collect::<Vec<_>>()
        .chunks(limit.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}
