//! Transport-neutral core of the feedback relay.
//!
//! Users write to the bot privately; their messages are relayed into a single
//! administrator channel. Administrators answer by replying to a relayed
//! message, block or unblock senders, and browse message statistics.
//!
//! The [`Router`] owns all state and talks to the messaging platform only
//! through the [`Outbound`] trait, so the same routing runs against Telegram
//! and against in-memory fakes in tests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use relay_core::{ChatId, Outbound, RelayConfig, Router};
//!
//! # async fn run(outbound: Arc<dyn Outbound>, event: relay_core::InboundEvent) {
//! let config = RelayConfig::new(ChatId(-1001234567890)).with_responder_name("Support");
//! let router = Router::new(config, outbound);
//! router.route_event(event).await;
//! # }
//! ```

pub mod bounded;
pub mod clock;
pub mod config;
pub mod control;
pub mod conversation;
pub mod dedup;
pub mod error;
pub mod event;
pub mod ids;
pub mod keyboard;
pub mod moderation;
pub mod outbound;
pub mod router;
pub mod settings;
pub mod stats;
pub mod texts;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RelayConfig, DEFAULT_RESPONDER_NAME};
pub use control::ControlAction;
pub use conversation::{CoalescePolicy, LastRelay};
pub use error::{RelayError, Result};
pub use event::{
    ChatKind, ChatRef, Content, ContentKind, ControlActivation, InboundEvent, InboundMessage, Payload, Sender,
};
pub use ids::{BatchId, ChatId, EventId, MediaRef, MessageId, NotificationRef, UserId};
pub use keyboard::{Button, Controls};
pub use moderation::AuditInfo;
pub use outbound::{Identity, Outbound};
pub use router::Router;
pub use settings::{Language, UserSettings};
pub use stats::{StatsPeriod, StatsSummary};
