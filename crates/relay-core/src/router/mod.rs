//! The router: classifies each admitted event and coordinates the stores.
//!
//! All state lives behind a single async mutex that is held for the whole
//! routing of one event, outbound calls included. Two events therefore never
//! interleave their writes, and events are routed in the order they acquire
//! the lock.

mod admin;
mod user;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RelayConfig;
use crate::conversation::{ConversationTracker, LastRelay};
use crate::dedup::EventDeduplicator;
use crate::event::{ChatKind, ChatRef, InboundEvent, Payload};
use crate::ids::{ChatId, NotificationRef, UserId};
use crate::keyboard::Controls;
use crate::moderation::{AuditInfo, ModerationStore, PendingActions};
use crate::outbound::Outbound;
use crate::settings::SettingsStore;
use crate::stats::{StatsLog, StatsPeriod, StatsSummary};

/// Every store the router owns.
#[derive(Debug)]
pub(crate) struct RelayState {
    pub dedup: EventDeduplicator,
    pub settings: SettingsStore,
    pub moderation: ModerationStore,
    pub pending: PendingActions,
    pub conversations: ConversationTracker,
    pub stats: StatsLog,
}

impl RelayState {
    fn new(config: &RelayConfig) -> Self {
        Self {
            dedup: EventDeduplicator::new(config.dedup_capacity),
            settings: SettingsStore::new(),
            moderation: ModerationStore::new(),
            pending: PendingActions::new(),
            conversations: ConversationTracker::new(config.binding_capacity, config.batch_capacity),
            stats: StatsLog::new(),
        }
    }
}

/// Where an event came from, from the router's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Admin,
    Private,
    Ignored,
}

/// Orchestrates routing between users and the administrator channel.
pub struct Router {
    config: RelayConfig,
    outbound: Arc<dyn Outbound>,
    clock: Arc<dyn Clock>,
    state: Mutex<RelayState>,
}

impl Router {
    /// Creates a router using the system clock.
    pub fn new(config: RelayConfig, outbound: Arc<dyn Outbound>) -> Self {
        Self::with_clock(config, outbound, Arc::new(SystemClock))
    }

    /// Creates a router with a custom clock.
    pub fn with_clock(config: RelayConfig, outbound: Arc<dyn Outbound>, clock: Arc<dyn Clock>) -> Self {
        let state = RelayState::new(&config);
        Self {
            config,
            outbound,
            clock,
            state: Mutex::new(state),
        }
    }

    /// The router configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Routes one inbound event.
    ///
    /// Re-delivery of an already routed event identifier is a no-op. Never fails:
    /// outbound errors are logged and absorbed where they occur.
    pub async fn route_event(&self, event: InboundEvent) {
        let mut state = self.state.lock().await;

        if !state.dedup.should_process(event.id) {
            debug!(event_id = %event.id, "Skipping already processed event");
            return;
        }

        let context = self.classify(event.chat);
        debug!(event_id = %event.id, chat_id = %event.chat.id, ?context, "Routing event");

        let mut routing = Routing {
            config: &self.config,
            out: self.outbound.as_ref(),
            now: self.clock.now(),
            state: &mut state,
        };

        match context {
            Context::Admin => routing.route_admin(&event.sender, event.payload).await,
            Context::Private => routing.route_private(&event.sender, event.payload).await,
            Context::Ignored => {
                if let Payload::Control(control) = &event.payload {
                    routing.answer(&control.callback_id, None, false).await;
                }
                debug!(chat_id = %event.chat.id, "Ignoring event from unrelated chat");
            }
        }
    }

    fn classify(&self, chat: ChatRef) -> Context {
        if chat.id == self.config.admin_chat {
            Context::Admin
        } else if chat.kind == ChatKind::Private {
            Context::Private
        } else {
            Context::Ignored
        }
    }

    // --- Snapshots ---

    /// Whether a user is currently blocked.
    pub async fn is_blocked(&self, user: UserId) -> bool {
        self.state.lock().await.moderation.is_blocked(user)
    }

    /// Blocked users in ascending order.
    #[cfg(test)]
    pub(crate) async fn blocked_users(&self) -> Vec<UserId> {
        self.state.lock().await.moderation.list_blocked()
    }

    /// Audit record of a blocked user.
    pub async fn audit_of(&self, user: UserId) -> Option<AuditInfo> {
        self.state.lock().await.moderation.audit_of(user).cloned()
    }

    /// Settings of a user, if the user has been seen.
    #[cfg(test)]
    pub(crate) async fn settings_of(&self, user: UserId) -> Option<crate::settings::UserSettings> {
        self.state.lock().await.settings.peek(user).cloned()
    }

    /// User a relayed notification is bound to.
    pub async fn resolve_reply(&self, notification: NotificationRef) -> Option<UserId> {
        self.state.lock().await.conversations.resolve_reply(notification)
    }

    /// Number of reply bindings.
    pub async fn binding_count(&self) -> usize {
        self.state.lock().await.conversations.binding_count()
    }

    /// Last relayed notification of a user.
    pub async fn last_relay_of(&self, user: UserId) -> Option<LastRelay> {
        self.state.lock().await.conversations.last_relay_of(user).cloned()
    }

    /// Statistics for a period ending now.
    pub async fn stats(&self, period: StatsPeriod) -> StatsSummary {
        let now = self.clock.now();
        self.state.lock().await.stats.summarize(period, now)
    }
}

/// Routing of a single event with exclusive access to the stores.
struct Routing<'a> {
    config: &'a RelayConfig,
    out: &'a dyn Outbound,
    now: DateTime<Utc>,
    state: &'a mut RelayState,
}

impl Routing<'_> {
    /// Sends a text, logging failures.
    async fn notify(&self, chat: ChatId, text: &str, controls: Option<&Controls>) -> Option<NotificationRef> {
        match self.out.send_text(chat, text, controls).await {
            Ok(note) => Some(note),
            Err(e) => {
                warn!(chat_id = %chat, error = %e, "Failed to send message");
                None
            }
        }
    }

    /// Answers a control activation, logging failures.
    async fn answer(&self, callback_id: &str, notice: Option<&str>, alert: bool) {
        if let Err(e) = self.out.answer_control(callback_id, notice, alert).await {
            warn!(callback_id, error = %e, "Failed to answer control");
        }
    }

    /// Replaces the controls of a message, logging failures.
    async fn swap_controls(&self, target: NotificationRef, controls: &Controls) {
        if let Err(e) = self.out.edit_controls(target, Some(controls)).await {
            warn!(target = %target, error = %e, "Failed to replace controls");
        }
    }
}

/// Extracts the command name from a `/command@bot args` text.
fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    Some(name.split('@').next().unwrap_or(name))
}
