pub mod commands;
pub mod messages;
pub mod relay;
pub mod telegram;
pub mod utils;

pub use commands::command_handler;
pub use messages::{message_handler, photo_handler};
pub use relay::Relay;

use std::time::Duration;

use tokio::time;

/// Periodically drops pending images nobody asked about.
pub async fn sweep_pending_images_task(relay: Relay, ttl: Duration) {
    let mut interval = time::interval(
        Duration::from_secs(60)
            .min(ttl)
            .max(Duration::from_secs(1)),
    );

    loop {
        interval.tick().await;

        let removed = relay.store().sweep_expired(ttl).await;
        if removed > 0 {
            log::info!("🧹 Dropped {} pending images older than {:?}", removed, ttl);
        }
    }
}
