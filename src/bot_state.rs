use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use teloxide::types::UserId;
use tokio::sync::RwLock;

use crate::models::{ConversationPhase, PendingImage};

/// Per-user pending image storage.
///
/// Every operation is atomic for its key. Callers never hold anything across an
/// await, so a question handler works from the snapshot returned by `get_image`.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Stores `bytes` as the user's pending image, replacing any previous one.
    async fn put_image(&self, user: UserId, bytes: Vec<u8>) -> PendingImage;

    async fn get_image(&self, user: UserId) -> Option<PendingImage>;

    /// Removes the user's state. Returns whether anything was stored.
    async fn clear(&self, user: UserId) -> bool;

    /// Removes the user's state only if it still holds the image with `ticket`.
    async fn clear_if_current(&self, user: UserId, ticket: u64) -> bool;

    async fn has_pending(&self, user: UserId) -> bool;

    /// Drops pending images received more than `ttl` ago.
    async fn sweep_expired(&self, ttl: Duration) -> usize;

    async fn phase(&self, user: UserId) -> ConversationPhase {
        if self.has_pending(user).await {
            ConversationPhase::AwaitingQuestion
        } else {
            ConversationPhase::Idle
        }
    }
}

type ImageCache = Arc<RwLock<HashMap<UserId, PendingImage>>>;

/// Process-local store. State does not survive a restart.
#[derive(Clone, Default)]
pub struct BotState {
    images: ImageCache,
    next_ticket: Arc<AtomicU64>,
}

impl BotState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for BotState {
    async fn put_image(&self, user: UserId, bytes: Vec<u8>) -> PendingImage {
        let image = PendingImage {
            ticket: self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1,
            bytes: bytes.into(),
            received_at: SystemTime::now(),
        };

        let replaced = {
            let mut images = self.images.write().await;
            images.insert(user, image.clone()).is_some()
        };

        log::debug!(
            "🖼 Pending image #{} stored for user {} (replaced: {})",
            image.ticket,
            user,
            replaced
        );
        image
    }

    async fn get_image(&self, user: UserId) -> Option<PendingImage> {
        let images = self.images.read().await;
        images.get(&user).cloned()
    }

    async fn clear(&self, user: UserId) -> bool {
        let mut images = self.images.write().await;
        images.remove(&user).is_some()
    }

    async fn clear_if_current(&self, user: UserId, ticket: u64) -> bool {
        let mut images = self.images.write().await;
        match images.get(&user) {
            Some(image) if image.ticket == ticket => {
                images.remove(&user);
                true
            }
            _ => false,
        }
    }

    async fn has_pending(&self, user: UserId) -> bool {
        let images = self.images.read().await;
        images.contains_key(&user)
    }

    async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut images = self.images.write().await;
        let now = SystemTime::now();
        let previous_count = images.len();

        images.retain(|_, image| {
            now.duration_since(image.received_at).unwrap_or_default() < ttl
        });

        let removed = previous_count - images.len();
        log::debug!(
            "🧹 Pending images swept: {} -> {} entries",
            previous_count,
            images.len()
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    #[tokio::test]
    async fn put_then_get_returns_the_same_bytes() {
        let state = BotState::new();
        state.put_image(ALICE, vec![1, 2, 3]).await;

        let image = state.get_image(ALICE).await.unwrap();
        assert_eq!(&*image.bytes, &[1, 2, 3]);
        assert!(state.has_pending(ALICE).await);
        assert!(!state.has_pending(BOB).await);
    }

    #[tokio::test]
    async fn get_does_not_consume_the_image() {
        let state = BotState::new();
        state.put_image(ALICE, vec![7]).await;

        assert!(state.get_image(ALICE).await.is_some());
        assert!(state.get_image(ALICE).await.is_some());
    }

    #[tokio::test]
    async fn second_image_overwrites_the_first() {
        let state = BotState::new();
        let first = state.put_image(ALICE, vec![1]).await;
        let second = state.put_image(ALICE, vec![2]).await;

        assert!(second.ticket > first.ticket);
        let stored = state.get_image(ALICE).await.unwrap();
        assert_eq!(&*stored.bytes, &[2]);
        assert_eq!(stored.ticket, second.ticket);
    }

    #[tokio::test]
    async fn clear_reports_whether_state_existed() {
        let state = BotState::new();
        assert!(!state.clear(ALICE).await);

        state.put_image(ALICE, vec![1]).await;
        assert!(state.clear(ALICE).await);
        assert!(!state.has_pending(ALICE).await);
        assert!(!state.clear(ALICE).await);
    }

    #[tokio::test]
    async fn clear_if_current_keeps_a_newer_image() {
        let state = BotState::new();
        let old = state.put_image(ALICE, vec![1]).await;
        let new = state.put_image(ALICE, vec![2]).await;

        assert!(!state.clear_if_current(ALICE, old.ticket).await);
        assert_eq!(state.get_image(ALICE).await.unwrap().ticket, new.ticket);
        assert!(state.clear_if_current(ALICE, new.ticket).await);
        assert_eq!(state.phase(ALICE).await, ConversationPhase::Idle);
    }

    #[tokio::test]
    async fn users_are_independent() {
        let state = BotState::new();
        state.put_image(ALICE, vec![1]).await;
        state.put_image(BOB, vec![2]).await;

        state.clear(ALICE).await;
        assert_eq!(state.phase(ALICE).await, ConversationPhase::Idle);
        assert_eq!(state.phase(BOB).await, ConversationPhase::AwaitingQuestion);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_images() {
        let state = BotState::new();
        state.put_image(ALICE, vec![1]).await;
        {
            let mut images = state.images.write().await;
            if let Some(image) = images.get_mut(&ALICE) {
                image.received_at = SystemTime::now() - Duration::from_secs(120);
            }
        }
        state.put_image(BOB, vec![2]).await;

        assert_eq!(state.sweep_expired(Duration::from_secs(60)).await, 1);
        assert!(!state.has_pending(ALICE).await);
        assert!(state.has_pending(BOB).await);
    }

    #[tokio::test]
    async fn concurrent_puts_from_many_users_are_all_kept() {
        let state = BotState::new();
        let tasks: Vec<_> = (0..32u64)
            .map(|id| {
                let state = state.clone();
                tokio::spawn(async move { state.put_image(UserId(id), vec![id as u8]).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        for id in 0..32u64 {
            let image = state.get_image(UserId(id)).await.unwrap();
            assert_eq!(&*image.bytes, &[id as u8]);
        }
    }
}
