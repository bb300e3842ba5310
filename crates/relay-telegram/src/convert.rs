//! Conversion of Telegram updates into relay events.

use relay_core::{
    ChatId, ChatRef, Content, ControlActivation, EventId, InboundEvent, InboundMessage, MediaRef, MessageId,
    NotificationRef, Sender, UserId,
};
use teloxide::types::{CallbackQuery, Chat, Message, Update, UpdateKind, User};
use tracing::debug;

use crate::error::Result;

/// Parses a raw update body.
pub fn parse_update(body: &[u8]) -> Result<Update> {
    Ok(serde_json::from_slice(body)?)
}

/// Converts an update into a relay event.
///
/// Returns `None` for update kinds the relay does not handle (edits, channel
/// posts, inline queries) and for messages without a sender.
pub fn convert_update(update: Update) -> Option<InboundEvent> {
    let id = EventId(u64::from(update.id.0));
    match update.kind {
        UpdateKind::Message(msg) => message_event(id, &msg),
        UpdateKind::CallbackQuery(query) => control_event(id, &query),
        other => {
            debug!(update_id = %id, "Ignoring update kind: {:?}", other);
            None
        }
    }
}

fn message_event(id: EventId, msg: &Message) -> Option<InboundEvent> {
    let from = msg.from.as_ref()?;

    let mut message = InboundMessage::new(MessageId(msg.id.0), content_of(msg));
    if let Some(group) = msg.media_group_id() {
        message = message.in_batch(group.to_string());
    }
    if let Some(reply) = msg.reply_to_message() {
        message = message.replying_to(MessageId(reply.id.0));
    }

    Some(InboundEvent::message(id, chat_ref(&msg.chat), sender_of(from), message))
}

fn control_event(id: EventId, query: &CallbackQuery) -> Option<InboundEvent> {
    let sender = sender_of(&query.from);
    let origin = query.message.as_ref();

    let chat = match origin {
        Some(m) => chat_ref(m.chat()),
        None => ChatRef::private(sender.id),
    };
    let control = ControlActivation {
        callback_id: query.id.to_string(),
        data: query.data.clone().unwrap_or_default(),
        origin: origin.map(|m| NotificationRef::new(ChatId(m.chat().id.0), MessageId(m.id().0))),
    };

    Some(InboundEvent::control(id, chat, sender, control))
}

/// Text, the largest photo size, or a video; everything else is unsupported.
fn content_of(msg: &Message) -> Content {
    if let Some(text) = msg.text() {
        return Content::Text(text.to_string());
    }

    let caption = msg.caption().map(String::from);
    if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
        return Content::Photo {
            media: MediaRef::new(largest.file.id.to_string()),
            caption,
        };
    }
    if let Some(video) = msg.video() {
        return Content::Video {
            media: MediaRef::new(video.file.id.to_string()),
            caption,
        };
    }
    Content::Unsupported
}

fn chat_ref(chat: &Chat) -> ChatRef {
    if chat.is_private() {
        ChatRef::private(UserId(chat.id.0))
    } else {
        ChatRef::group(ChatId(chat.id.0))
    }
}

fn sender_of(user: &User) -> Sender {
    let sender = Sender::new(UserId(user.id.0 as i64), user.full_name());
    match &user.username {
        Some(handle) => sender.with_handle(handle.clone()),
        None => sender,
    }
}
