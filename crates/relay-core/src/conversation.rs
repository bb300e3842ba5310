//! Tracks relayed notifications: reply bindings, coalescing targets and
//! acknowledged media batches.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::bounded::{BoundedMap, BoundedSet};
use crate::ids::{BatchId, NotificationRef, UserId};

/// Default number of remembered reply bindings.
pub const DEFAULT_BINDING_CAPACITY: usize = 100_000;

/// Default number of remembered batch identifiers.
pub const DEFAULT_BATCH_CAPACITY: usize = 10_000;

/// Maximum length of a text notification, in characters.
pub const TEXT_LIMIT: usize = 4096;

/// Maximum length of a media caption, in characters.
pub const CAPTION_LIMIT: usize = 1024;

/// The most recent notification relayed for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRelay {
    /// The notification in the administrator channel.
    pub notification: NotificationRef,
    /// Full rendered text (or caption) of the notification.
    pub text: String,
    /// When the notification was created or last extended.
    pub updated_at: DateTime<Utc>,
    /// Whether the notification is a photo/video with a caption.
    pub has_media: bool,
    /// Anonymity flag the notification was rendered with.
    pub anonymous: bool,
    /// Number of addenda appended so far.
    pub addenda: usize,
}

impl LastRelay {
    /// A freshly created notification.
    pub fn new(
        notification: NotificationRef,
        text: impl Into<String>,
        now: DateTime<Utc>,
        has_media: bool,
        anonymous: bool,
    ) -> Self {
        Self {
            notification,
            text: text.into(),
            updated_at: now,
            has_media,
            anonymous,
            addenda: 0,
        }
    }

    /// Length limit of the notification body.
    pub fn limit(&self) -> usize {
        if self.has_media {
            CAPTION_LIMIT
        } else {
            TEXT_LIMIT
        }
    }

    /// Whether `candidate` fits in this notification.
    pub fn fits(&self, candidate: &str) -> bool {
        candidate.chars().count() <= self.limit()
    }
}

/// When a new text may be merged into the previous notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoalescePolicy {
    /// Maximum age of the last update.
    pub window: Duration,
    /// Maximum number of addenda per notification.
    pub max_addenda: usize,
}

impl Default for CoalescePolicy {
    fn default() -> Self {
        Self {
            window: Duration::seconds(60),
            max_addenda: 20,
        }
    }
}

/// Bidirectional bookkeeping between relayed notifications and users.
#[derive(Debug)]
pub struct ConversationTracker {
    bindings: BoundedMap<NotificationRef, UserId>,
    last: HashMap<UserId, LastRelay>,
    batches: BoundedSet<BatchId>,
}

impl ConversationTracker {
    /// Creates a tracker with the given memory bounds.
    pub fn new(binding_capacity: usize, batch_capacity: usize) -> Self {
        Self {
            bindings: BoundedMap::new(binding_capacity),
            last: HashMap::new(),
            batches: BoundedSet::new(batch_capacity),
        }
    }

    /// Associates a relayed notification with its originating user.
    pub fn bind_reply(&mut self, notification: NotificationRef, user: UserId) {
        self.bindings.insert(notification, user);
    }

    /// Finds the user a notification was relayed for.
    pub fn resolve_reply(&self, notification: NotificationRef) -> Option<UserId> {
        self.bindings.get(&notification).copied()
    }

    /// Number of reply bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// The last notification relayed for a user.
    pub fn last_relay_of(&self, user: UserId) -> Option<&LastRelay> {
        self.last.get(&user)
    }

    /// Replaces the last notification relayed for a user.
    pub fn set_last_relay(&mut self, user: UserId, relay: LastRelay) {
        self.last.insert(user, relay);
    }

    /// Returns the notification a new text at `now` should be appended to.
    ///
    /// The window is measured from the last update, so every append extends it.
    pub fn coalesce_target(
        &self,
        user: UserId,
        now: DateTime<Utc>,
        anonymous: bool,
        policy: &CoalescePolicy,
    ) -> Option<&LastRelay> {
        let last = self.last.get(&user)?;
        let age = now - last.updated_at;
        if age < Duration::zero() || age > policy.window {
            return None;
        }
        if last.anonymous != anonymous || last.addenda >= policy.max_addenda {
            return None;
        }
        Some(last)
    }

    /// Records a successful append to the last notification.
    pub fn record_append(&mut self, user: UserId, text: String, now: DateTime<Utc>) {
        if let Some(last) = self.last.get_mut(&user) {
            last.text = text;
            last.updated_at = now;
            last.addenda += 1;
        }
    }

    /// Whether the first item of a batch has already been relayed.
    pub fn is_batch_acknowledged(&self, batch: &BatchId) -> bool {
        self.batches.contains(batch)
    }

    /// Marks a batch as relayed. Returns `false` if it already was.
    pub fn acknowledge_batch(&mut self, batch: BatchId) -> bool {
        self.batches.insert(batch)
    }
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BINDING_CAPACITY, DEFAULT_BATCH_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ChatId, MessageId};
    use chrono::TimeZone;

    fn note(n: i32) -> NotificationRef {
        NotificationRef::new(ChatId(-100), MessageId(n))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_bindings() {
        let mut tracker = ConversationTracker::default();
        tracker.bind_reply(note(1), UserId(10));
        tracker.bind_reply(note(2), UserId(20));

        assert_eq!(tracker.resolve_reply(note(1)), Some(UserId(10)));
        assert_eq!(tracker.resolve_reply(note(2)), Some(UserId(20)));
        assert_eq!(tracker.resolve_reply(note(3)), None);

        // Lookups do not consume the binding
        assert_eq!(tracker.resolve_reply(note(1)), Some(UserId(10)));

        tracker.bind_reply(note(1), UserId(30));
        assert_eq!(tracker.resolve_reply(note(1)), Some(UserId(30)));
        assert_eq!(tracker.binding_count(), 2);
    }

    #[test]
    fn test_coalesce_within_window() {
        let mut tracker = ConversationTracker::default();
        let policy = CoalescePolicy::default();
        tracker.set_last_relay(UserId(1), LastRelay::new(note(1), "Hello", t0(), false, false));

        let at_30 = t0() + Duration::seconds(30);
        assert!(tracker.coalesce_target(UserId(1), at_30, false, &policy).is_some());

        let at_60 = t0() + Duration::seconds(60);
        assert!(tracker.coalesce_target(UserId(1), at_60, false, &policy).is_some());

        let at_61 = t0() + Duration::seconds(61);
        assert!(tracker.coalesce_target(UserId(1), at_61, false, &policy).is_none());
    }

    #[test]
    fn test_append_extends_window() {
        let mut tracker = ConversationTracker::default();
        let policy = CoalescePolicy::default();
        tracker.set_last_relay(UserId(1), LastRelay::new(note(1), "a", t0(), false, false));

        let at_50 = t0() + Duration::seconds(50);
        tracker.record_append(UserId(1), "a\nb".into(), at_50);

        let at_100 = t0() + Duration::seconds(100);
        let last = tracker.coalesce_target(UserId(1), at_100, false, &policy).unwrap();
        assert_eq!(last.text, "a\nb");
        assert_eq!(last.addenda, 1);
    }

    #[test]
    fn test_coalesce_requires_same_anonymity() {
        let mut tracker = ConversationTracker::default();
        let policy = CoalescePolicy::default();
        tracker.set_last_relay(UserId(1), LastRelay::new(note(1), "x", t0(), false, true));
        assert!(tracker.coalesce_target(UserId(1), t0(), false, &policy).is_none());
        assert!(tracker.coalesce_target(UserId(1), t0(), true, &policy).is_some());
    }

    #[test]
    fn test_coalesce_respects_max_addenda() {
        let mut tracker = ConversationTracker::default();
        let policy = CoalescePolicy {
            window: Duration::seconds(60),
            max_addenda: 1,
        };
        tracker.set_last_relay(UserId(1), LastRelay::new(note(1), "x", t0(), false, false));
        tracker.record_append(UserId(1), "x y".into(), t0());
        assert!(tracker.coalesce_target(UserId(1), t0(), false, &policy).is_none());
    }

    #[test]
    fn test_limits() {
        let text = LastRelay::new(note(1), "", t0(), false, false);
        let media = LastRelay::new(note(2), "", t0(), true, false);
        let long = "x".repeat(2000);
        assert!(text.fits(&long));
        assert!(!media.fits(&long));
    }

    #[test]
    fn test_batch_acknowledgement() {
        let mut tracker = ConversationTracker::default();
        let batch = BatchId::new("g1");
        assert!(!tracker.is_batch_acknowledged(&batch));
        assert!(tracker.acknowledge_batch(batch.clone()));
        assert!(tracker.is_batch_acknowledged(&batch));
        assert!(!tracker.acknowledge_batch(batch));
    }
}
