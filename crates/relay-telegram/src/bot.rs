//! Bot runtime: webhook and long-polling modes feeding a single router task.

use std::sync::Arc;
use std::time::Duration;

use relay_core::{InboundEvent, Router};
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use teloxide::{ApiError, RequestError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::TelegramConfig;
use crate::convert::convert_update;
use crate::error::{Result, TelegramError};
use crate::outbound::TelegramOutbound;
use crate::webhook;

/// Capacity of the queue between the transport and the router task.
const EVENT_QUEUE_CAPACITY: usize = 1024;

/// Long-polling timeout, in seconds.
const POLL_TIMEOUT_SECS: u32 = 30;

/// Pause after a failed `getUpdates` call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// The feedback relay bot.
pub struct RelayBot {
    bot: Bot,
    config: TelegramConfig,
    router: Arc<Router>,
}

impl RelayBot {
    /// Creates the bot and its router from configuration.
    pub fn new(config: TelegramConfig) -> Result<Self> {
        // The HTTP client timeout must outlast the long-polling timeout.
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(u64::from(POLL_TIMEOUT_SECS) + 15))
            .build()
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        let bot = Bot::with_client(config.token.clone(), client);

        let outbound = Arc::new(TelegramOutbound::new(bot.clone()));
        let router = Arc::new(Router::new(config.relay.clone(), outbound));

        Ok(Self { bot, config, router })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// The router shared by both transport modes.
    pub fn router(&self) -> Arc<Router> {
        Arc::clone(&self.router)
    }

    /// Runs the webhook server until Ctrl+C.
    ///
    /// Registers the webhook with Telegram when a public URL is configured.
    pub async fn run_webhook(self) -> Result<()> {
        match self.config.webhook_endpoint()? {
            Some(url) => {
                self.bot
                    .set_webhook(url.clone())
                    .await
                    .map_err(|e| TelegramError::WebhookFailed(e.to_string()))?;
                info!(url = %url, "Webhook registered");
            }
            None => warn!("WEBHOOK_URL not set; the webhook must be registered externally"),
        }

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let worker = spawn_routing_worker(self.router(), rx);

        let app = webhook::create_router(&self.config.webhook_path, tx);
        webhook::serve(&self.config.bind_address(), app, shutdown_signal()).await?;

        // The server dropped its sender; the worker drains what is left.
        wait_for_worker(worker).await;
        Ok(())
    }

    /// Runs the long-polling loop until Ctrl+C.
    pub async fn run_polling(self) -> Result<()> {
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        info!("Webhook cleared, starting long polling");

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let worker = spawn_routing_worker(self.router(), rx);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);
        let mut offset: i32 = 0;

        loop {
            let request = self
                .bot
                .get_updates()
                .offset(offset)
                .timeout(POLL_TIMEOUT_SECS)
                .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery]);

            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = request.send() => result,
            };

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "Received updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        let Some(event) = convert_update(update) else {
                            continue;
                        };
                        if tx.send(event).await.is_err() {
                            error!("Routing queue is closed");
                            return Ok(());
                        }
                    }
                }
                Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                    return Err(TelegramError::BotStartFailed(
                        "another instance is already polling with this token".into(),
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }

        drop(tx);
        wait_for_worker(worker).await;
        Ok(())
    }
}

/// Spawns the single task that routes queued events one at a time, in order.
pub fn spawn_routing_worker(router: Arc<Router>, mut events: mpsc::Receiver<InboundEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            router.route_event(event).await;
        }
        info!("Routing queue drained");
    })
}

async fn wait_for_worker(worker: JoinHandle<()>) {
    if let Err(e) = worker.await {
        error!(error = %e, "Routing task failed");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
