//! Router configuration.

use std::collections::HashSet;

use chrono::Duration;

use crate::conversation::{CoalescePolicy, DEFAULT_BATCH_CAPACITY, DEFAULT_BINDING_CAPACITY};
use crate::dedup::DEFAULT_DEDUP_CAPACITY;
use crate::ids::{ChatId, UserId};
use crate::settings::Language;

/// Default responder name shown in reply headers.
pub const DEFAULT_RESPONDER_NAME: &str = "Administrator";

/// Configuration of the relay router.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The administrator channel.
    pub admin_chat: ChatId,
    /// Senders allowed to act in the administrator channel. Empty means everyone there.
    pub admin_ids: HashSet<UserId>,
    /// Name shown to users in reply headers.
    pub responder_name: String,
    /// Language of administrator-facing texts.
    pub admin_language: Language,
    /// Text coalescing policy.
    pub coalesce: CoalescePolicy,
    /// Remembered processed event identifiers.
    pub dedup_capacity: usize,
    /// Remembered reply bindings.
    pub binding_capacity: usize,
    /// Remembered media batch identifiers.
    pub batch_capacity: usize,
}

impl RelayConfig {
    /// Creates a configuration for the given administrator channel.
    pub fn new(admin_chat: ChatId) -> Self {
        Self {
            admin_chat,
            admin_ids: HashSet::new(),
            responder_name: DEFAULT_RESPONDER_NAME.to_string(),
            admin_language: Language::default(),
            coalesce: CoalescePolicy::default(),
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            binding_capacity: DEFAULT_BINDING_CAPACITY,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        }
    }

    /// Restricts administrator actions to the given senders.
    pub fn with_admin_ids(mut self, ids: impl IntoIterator<Item = UserId>) -> Self {
        self.admin_ids = ids.into_iter().collect();
        self
    }

    /// Sets the responder name.
    pub fn with_responder_name(mut self, name: impl Into<String>) -> Self {
        self.responder_name = name.into();
        self
    }

    /// Sets the administrator language.
    pub fn with_admin_language(mut self, language: Language) -> Self {
        self.admin_language = language;
        self
    }

    /// Sets the coalescing window.
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce.window = window;
        self
    }

    /// Sets the maximum number of addenda per notification.
    pub fn with_max_addenda(mut self, max: usize) -> Self {
        self.coalesce.max_addenda = max;
        self
    }

    /// Whether `user` may act in the administrator channel.
    pub fn is_admin(&self, user: UserId) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::new(ChatId(-100));
        assert_eq!(config.admin_chat, ChatId(-100));
        assert_eq!(config.responder_name, DEFAULT_RESPONDER_NAME);
        assert_eq!(config.coalesce.window, Duration::seconds(60));
        assert_eq!(config.admin_language, Language::Ru);
    }

    #[test]
    fn test_open_admin_channel() {
        let config = RelayConfig::new(ChatId(-100));
        assert!(config.is_admin(UserId(1)));
        assert!(config.is_admin(UserId(2)));
    }

    #[test]
    fn test_restricted_admins() {
        let config = RelayConfig::new(ChatId(-100)).with_admin_ids([UserId(1)]);
        assert!(config.is_admin(UserId(1)));
        assert!(!config.is_admin(UserId(2)));
    }

    #[test]
    fn test_builders() {
        let config = RelayConfig::new(ChatId(-1))
            .with_responder_name("Support")
            .with_admin_language(Language::En)
            .with_coalesce_window(Duration::seconds(5))
            .with_max_addenda(3);
        assert_eq!(config.responder_name, "Support");
        assert_eq!(config.admin_language, Language::En);
        assert_eq!(config.coalesce.window, Duration::seconds(5));
        assert_eq!(config.coalesce.max_addenda, 3);
    }
}
