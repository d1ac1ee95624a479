use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use log::info;
use tokio::sync::Mutex;

use crate::services::chat_service::Conversation;

pub type ConversationHandle = Arc<Mutex<Conversation>>;

/// Per-user conversations, keyed by the id stored in the session cookie.
///
/// Each handle carries its own async lock, so two requests from the same
/// browser take turns while different users never contend.
#[derive(Clone)]
pub struct ConversationManager {
    conversations: Arc<DashMap<String, ConversationHandle>>,
    idle_ttl: Duration,
}

impl ConversationManager {
    pub fn new(idle_ttl: Duration) -> Self {
        ConversationManager {
            conversations: Arc::new(DashMap::new()),
            idle_ttl,
        }
    }

    /// Returns the existing conversation or seeds a new one.
    pub fn get_or_create<F>(&self, id: &str, seed: F) -> ConversationHandle
    where
        F: FnOnce() -> Conversation,
    {
        if let Some(existing) = self.conversations.get(id) {
            return existing.clone();
        }
        self.prune_idle();
        self.conversations
            .entry(id.to_string())
            .or_insert_with(|| {
                info!("Starting conversation {}", id);
                Arc::new(Mutex::new(seed()))
            })
            .clone()
    }

    pub fn remove(&self, id: &str) {
        if self.conversations.remove(id).is_some() {
            info!("Dropped conversation {}", id);
        }
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Drops conversations idle for longer than the TTL. Ones busy answering are kept.
    pub fn prune_idle(&self) {
        let ttl = self.idle_ttl;
        self.conversations.retain(|_, handle| match handle.try_lock() {
            Ok(conversation) => conversation.idle_for() < ttl,
            Err(_) => true,
        });
    }
}
