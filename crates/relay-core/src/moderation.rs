//! Blocked users, their audit records, and pending two-step confirmations.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NotificationRef, UserId};

/// Audit data captured when a user is blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    /// When the block was confirmed.
    pub blocked_at: DateTime<Utc>,
    /// Display name at block time, if the lookup succeeded.
    pub display_name: Option<String>,
    /// Handle at block time, if the lookup succeeded.
    pub handle: Option<String>,
}

impl AuditInfo {
    /// Audit record without identity data (lookup failed or was skipped).
    pub fn bare(blocked_at: DateTime<Utc>) -> Self {
        Self {
            blocked_at,
            display_name: None,
            handle: None,
        }
    }
}

/// Set of blocked users plus their audit log.
///
/// The blocked set is authoritative; audit entries are supplementary.
#[derive(Debug, Default)]
pub struct ModerationStore {
    blocked: BTreeSet<UserId>,
    audit: HashMap<UserId, AuditInfo>,
}

impl ModerationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the user is currently blocked.
    pub fn is_blocked(&self, user: UserId) -> bool {
        self.blocked.contains(&user)
    }

    /// Blocks a user, overwriting any previous audit record.
    pub fn block(&mut self, user: UserId, audit: AuditInfo) {
        self.blocked.insert(user);
        self.audit.insert(user, audit);
    }

    /// Unblocks a user and drops the audit record. No-op if not blocked.
    pub fn unblock(&mut self, user: UserId) -> bool {
        self.audit.remove(&user);
        self.blocked.remove(&user)
    }

    /// Blocked users in ascending identifier order.
    pub fn list_blocked(&self) -> Vec<UserId> {
        self.blocked.iter().copied().collect()
    }

    /// Audit record of a blocked user.
    pub fn audit_of(&self, user: UserId) -> Option<&AuditInfo> {
        self.audit.get(&user)
    }
}

/// A moderation action that requires confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationAction {
    Block,
    Unblock,
}

/// The administrator's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

/// Terminal outcome of a confirmation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Confirming {
    action: ModerationAction,
    user: UserId,
}

/// Confirmation flows awaiting an answer, keyed by the message carrying the prompt.
///
/// `Idle -> Confirming -> {Applied, Cancelled}`. A message without an entry is idle.
#[derive(Debug, Default)]
pub struct PendingActions {
    pending: HashMap<NotificationRef, Confirming>,
}

impl PendingActions {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a confirmation flow on `origin`.
    pub fn begin(&mut self, origin: NotificationRef, action: ModerationAction, user: UserId) {
        self.pending.insert(origin, Confirming { action, user });
    }

    /// Resolves the flow on `origin`.
    ///
    /// Returns `None` when `origin` is not confirming this exact action for
    /// this exact user; nothing is changed in that case.
    pub fn resolve(
        &mut self,
        origin: NotificationRef,
        action: ModerationAction,
        user: UserId,
        decision: Decision,
    ) -> Option<Resolution> {
        let expected = Confirming { action, user };
        if self.pending.get(&origin) != Some(&expected) {
            return None;
        }
        self.pending.remove(&origin);
        Some(match decision {
            Decision::Confirm => Resolution::Applied,
            Decision::Cancel => Resolution::Cancelled,
        })
    }

    /// The action and user awaiting confirmation on `origin`, if any.
    pub fn pending_on(&self, origin: NotificationRef) -> Option<(ModerationAction, UserId)> {
        self.pending.get(&origin).map(|c| (c.action, c.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ChatId, MessageId};

    fn origin(n: i32) -> NotificationRef {
        NotificationRef::new(ChatId(-100), MessageId(n))
    }

    #[test]
    fn test_block_and_unblock() {
        let mut store = ModerationStore::new();
        let now = Utc::now();

        store.block(UserId(3), AuditInfo::bare(now));
        assert!(store.is_blocked(UserId(3)));
        assert_eq!(store.audit_of(UserId(3)).unwrap().blocked_at, now);

        assert!(store.unblock(UserId(3)));
        assert!(!store.is_blocked(UserId(3)));
        assert!(store.audit_of(UserId(3)).is_none());

        // Idempotent
        assert!(!store.unblock(UserId(3)));
    }

    #[test]
    fn test_block_overwrites_audit() {
        let mut store = ModerationStore::new();
        store.block(UserId(3), AuditInfo::bare(Utc::now()));
        store.block(
            UserId(3),
            AuditInfo {
                blocked_at: Utc::now(),
                display_name: Some("Ann".into()),
                handle: Some("ann".into()),
            },
        );
        assert_eq!(store.list_blocked(), vec![UserId(3)]);
        assert_eq!(
            store.audit_of(UserId(3)).unwrap().display_name.as_deref(),
            Some("Ann")
        );
    }

    #[test]
    fn test_list_blocked_is_sorted() {
        let mut store = ModerationStore::new();
        for id in [50, -1, 7] {
            store.block(UserId(id), AuditInfo::bare(Utc::now()));
        }
        assert_eq!(store.list_blocked(), vec![UserId(-1), UserId(7), UserId(50)]);
    }

    #[test]
    fn test_pending_confirm() {
        let mut pending = PendingActions::new();
        pending.begin(origin(1), ModerationAction::Block, UserId(9));
        assert_eq!(pending.pending_on(origin(1)), Some((ModerationAction::Block, UserId(9))));

        let outcome = pending.resolve(origin(1), ModerationAction::Block, UserId(9), Decision::Confirm);
        assert_eq!(outcome, Some(Resolution::Applied));
        assert_eq!(pending.pending_on(origin(1)), None);

        // Already resolved
        let again = pending.resolve(origin(1), ModerationAction::Block, UserId(9), Decision::Confirm);
        assert_eq!(again, None);
    }

    #[test]
    fn test_pending_cancel() {
        let mut pending = PendingActions::new();
        pending.begin(origin(2), ModerationAction::Unblock, UserId(9));
        let outcome = pending.resolve(origin(2), ModerationAction::Unblock, UserId(9), Decision::Cancel);
        assert_eq!(outcome, Some(Resolution::Cancelled));
    }

    #[test]
    fn test_pending_mismatch_is_rejected() {
        let mut pending = PendingActions::new();
        pending.begin(origin(3), ModerationAction::Block, UserId(9));

        assert_eq!(
            pending.resolve(origin(3), ModerationAction::Block, UserId(10), Decision::Confirm),
            None
        );
        assert_eq!(
            pending.resolve(origin(3), ModerationAction::Unblock, UserId(9), Decision::Confirm),
            None
        );
        assert_eq!(
            pending.resolve(origin(4), ModerationAction::Block, UserId(9), Decision::Confirm),
            None
        );
        assert!(pending.pending_on(origin(3)).is_some());
    }
}
