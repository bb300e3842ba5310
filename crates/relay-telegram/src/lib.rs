//! Telegram transport for the feedback relay.
//!
//! Users write to the bot in private; their messages land in an
//! administrator group, where administrators answer by replying and moderate
//! senders with inline buttons. Routing lives in `relay_core`; this crate
//! converts Telegram updates into relay events, implements the outbound side
//! on the Bot API, and runs the webhook server or the long-polling loop.
//!
//! # Environment Variables
//!
//! Required:
//! - `BOT_TOKEN`: Bot token from @BotFather (`TELEGRAM_BOT_TOKEN` also accepted)
//! - `ADMIN_CHAT_ID`: Identifier of the administrator group
//!
//! Optional:
//! - `ADMIN_IDS`: Comma-separated user ids allowed to act as administrators
//! - `RESPONDER_NAME`: Name shown in reply headers (default: Administrator)
//! - `ADMIN_LANGUAGE`: `ru` or `en` (default: ru)
//! - `WEBHOOK_URL`: Public base URL; registered with Telegram on startup
//! - `WEBHOOK_PATH`: Webhook route (default: /webhook)
//! - `HOST` / `PORT`: Bind address (default: 0.0.0.0:8080)
//! - `COALESCE_WINDOW_SECS`: Text merge window (default: 60)
//!
//! # Example
//!
//! ```no_run
//! use relay_telegram::{RelayBot, TelegramConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TelegramConfig::from_env()?;
//!     let bot = RelayBot::new(config)?;
//!
//!     // Long polling for local development
//!     bot.run_polling().await?;
//!
//!     // Or serve the webhook
//!     // bot.run_webhook().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod config;
pub mod convert;
pub mod error;
pub mod outbound;
pub mod webhook;

pub use bot::{spawn_routing_worker, RelayBot};
pub use config::TelegramConfig;
pub use error::{Result, TelegramError};
pub use outbound::TelegramOutbound;
