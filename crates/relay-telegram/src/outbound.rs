//! Outbound messaging on top of the Telegram Bot API.

use async_trait::async_trait;
use relay_core::{
    ChatId, Controls, Identity, MediaRef, MessageId, NotificationRef, Outbound, RelayError, UserId,
};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::debug;

/// Sends and edits messages through a teloxide [`Bot`]. All texts use HTML parse mode.
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

fn tg_message(message: MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(message.0)
}

fn notification(chat: ChatId, sent: &Message) -> NotificationRef {
    NotificationRef::new(chat, MessageId(sent.id.0))
}

/// Converts transport-neutral controls into an inline keyboard.
pub fn inline_keyboard(controls: &Controls) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(controls.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.payload.clone()))
            .collect::<Vec<_>>()
    }))
}

fn outbound_error(e: RequestError) -> RelayError {
    RelayError::Outbound(e.to_string())
}

fn is_message_not_modified(e: &RequestError) -> bool {
    matches!(e, RequestError::Api(ApiError::MessageNotModified))
}

/// Treats "message is not modified" as success.
fn edit_result<T>(result: Result<T, RequestError>, target: NotificationRef) -> relay_core::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if is_message_not_modified(&e) => {
            debug!(target = %target, "Edit left the message unchanged");
            Ok(())
        }
        Err(e) => Err(outbound_error(e)),
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        controls: Option<&Controls>,
    ) -> relay_core::Result<NotificationRef> {
        let mut req = self.bot.send_message(tg_chat(chat), text).parse_mode(ParseMode::Html);
        if let Some(controls) = controls {
            req = req.reply_markup(inline_keyboard(controls));
        }
        let sent = req.await.map_err(outbound_error)?;
        Ok(notification(chat, &sent))
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        controls: Option<&Controls>,
    ) -> relay_core::Result<NotificationRef> {
        let file = InputFile::file_id(media.as_str().to_string());
        let mut req = self.bot.send_photo(tg_chat(chat), file);
        if let Some(caption) = caption {
            req = req.caption(caption).parse_mode(ParseMode::Html);
        }
        if let Some(controls) = controls {
            req = req.reply_markup(inline_keyboard(controls));
        }
        let sent = req.await.map_err(outbound_error)?;
        Ok(notification(chat, &sent))
    }

    async fn send_video(
        &self,
        chat: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        controls: Option<&Controls>,
    ) -> relay_core::Result<NotificationRef> {
        let file = InputFile::file_id(media.as_str().to_string());
        let mut req = self.bot.send_video(tg_chat(chat), file);
        if let Some(caption) = caption {
            req = req.caption(caption).parse_mode(ParseMode::Html);
        }
        if let Some(controls) = controls {
            req = req.reply_markup(inline_keyboard(controls));
        }
        let sent = req.await.map_err(outbound_error)?;
        Ok(notification(chat, &sent))
    }

    async fn edit_text(
        &self,
        target: NotificationRef,
        text: &str,
        controls: Option<&Controls>,
    ) -> relay_core::Result<()> {
        let mut req = self
            .bot
            .edit_message_text(tg_chat(target.chat), tg_message(target.message), text)
            .parse_mode(ParseMode::Html);
        if let Some(controls) = controls {
            req = req.reply_markup(inline_keyboard(controls));
        }
        edit_result(req.await, target)
    }

    async fn edit_caption(
        &self,
        target: NotificationRef,
        caption: &str,
        controls: Option<&Controls>,
    ) -> relay_core::Result<()> {
        let mut req = self
            .bot
            .edit_message_caption(tg_chat(target.chat), tg_message(target.message))
            .caption(caption)
            .parse_mode(ParseMode::Html);
        if let Some(controls) = controls {
            req = req.reply_markup(inline_keyboard(controls));
        }
        edit_result(req.await, target)
    }

    async fn edit_controls(&self, target: NotificationRef, controls: Option<&Controls>) -> relay_core::Result<()> {
        let mut req = self
            .bot
            .edit_message_reply_markup(tg_chat(target.chat), tg_message(target.message));
        if let Some(controls) = controls {
            req = req.reply_markup(inline_keyboard(controls));
        }
        edit_result(req.await, target)
    }

    async fn pin(&self, target: NotificationRef) -> relay_core::Result<()> {
        self.bot
            .pin_chat_message(tg_chat(target.chat), tg_message(target.message))
            .disable_notification(true)
            .await
            .map(|_| ())
            .map_err(outbound_error)
    }

    async fn lookup_identity(&self, user: UserId) -> relay_core::Result<Identity> {
        let chat = self
            .bot
            .get_chat(tg_chat(user.private_chat()))
            .await
            .map_err(outbound_error)?;

        let display_name = chat.first_name().map(|first| match chat.last_name() {
            Some(last) => format!("{first} {last}"),
            None => first.to_string(),
        });
        Ok(Identity {
            display_name,
            handle: chat.username().map(String::from),
        })
    }

    async fn answer_control(&self, callback_id: &str, notice: Option<&str>, alert: bool) -> relay_core::Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(notice) = notice {
            req = req.text(notice).show_alert(alert);
        }
        req.await.map(|_| ()).map_err(outbound_error)
    }
}
