//! Typed inbound events delivered by the transport.

use serde::{Deserialize, Serialize};

use crate::ids::{BatchId, ChatId, EventId, MediaRef, MessageId, NotificationRef, UserId};

/// Kind of conversation an event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one chat between a user and the bot.
    Private,
    /// Any multi-member chat (groups, supergroups, channels).
    Group,
}

/// The chat an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: ChatId,
    pub kind: ChatKind,
}

impl ChatRef {
    /// A private chat with the given user.
    pub fn private(user: UserId) -> Self {
        Self {
            id: user.private_chat(),
            kind: ChatKind::Private,
        }
    }

    /// A group chat.
    pub fn group(id: ChatId) -> Self {
        Self {
            id,
            kind: ChatKind::Group,
        }
    }
}

/// Who sent the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    pub display_name: String,
    pub handle: Option<String>,
}

impl Sender {
    /// Creates a sender without a handle.
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            handle: None,
        }
    }

    /// Sets the handle.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// Kinds of content that can be relayed and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Photo,
    Video,
}

/// Message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    Text(String),
    Photo {
        media: MediaRef,
        caption: Option<String>,
    },
    Video {
        media: MediaRef,
        caption: Option<String>,
    },
    /// Anything the relay does not carry (stickers, voice, documents, ...).
    Unsupported,
}

impl Content {
    /// Kind of relayable content, `None` for unsupported content.
    pub fn kind(&self) -> Option<ContentKind> {
        match self {
            Content::Text(_) => Some(ContentKind::Text),
            Content::Photo { .. } => Some(ContentKind::Photo),
            Content::Video { .. } => Some(ContentKind::Video),
            Content::Unsupported => None,
        }
    }

    /// The text body, or the caption of a media message.
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Photo { caption, .. } | Content::Video { caption, .. } => caption.as_deref(),
            Content::Unsupported => None,
        }
    }
}

/// An ordinary chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: MessageId,
    pub content: Content,
    /// Set for items of a grouped media upload.
    pub batch_id: Option<BatchId>,
    /// Message this one replies to, in the same chat.
    pub reply_to: Option<MessageId>,
}

impl InboundMessage {
    /// A message with no batch and no reply reference.
    pub fn new(message_id: MessageId, content: Content) -> Self {
        Self {
            message_id,
            content,
            batch_id: None,
            reply_to: None,
        }
    }

    /// Marks the message as part of a batch.
    pub fn in_batch(mut self, batch: impl Into<BatchId>) -> Self {
        self.batch_id = Some(batch.into());
        self
    }

    /// Marks the message as a reply.
    pub fn replying_to(mut self, message: MessageId) -> Self {
        self.reply_to = Some(message);
        self
    }
}

/// Activation of an interactive control (inline button).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlActivation {
    /// Transport handle used to answer the activation.
    pub callback_id: String,
    /// Opaque payload attached to the control.
    pub data: String,
    /// Message the control is attached to, if still accessible.
    pub origin: Option<NotificationRef>,
}

/// Event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Message(InboundMessage),
    Control(ControlActivation),
}

/// One deduplicated unit of work for the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub id: EventId,
    pub chat: ChatRef,
    pub sender: Sender,
    pub payload: Payload,
}

impl InboundEvent {
    /// A message event.
    pub fn message(id: EventId, chat: ChatRef, sender: Sender, message: InboundMessage) -> Self {
        Self {
            id,
            chat,
            sender,
            payload: Payload::Message(message),
        }
    }

    /// A control activation event.
    pub fn control(id: EventId, chat: ChatRef, sender: Sender, control: ControlActivation) -> Self {
        Self {
            id,
            chat,
            sender,
            payload: Payload::Control(control),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind() {
        assert_eq!(Content::Text("hi".into()).kind(), Some(ContentKind::Text));
        let photo = Content::Photo {
            media: MediaRef::new("p"),
            caption: None,
        };
        assert_eq!(photo.kind(), Some(ContentKind::Photo));
        assert_eq!(Content::Unsupported.kind(), None);
    }

    #[test]
    fn test_content_text() {
        let video = Content::Video {
            media: MediaRef::new("v"),
            caption: Some("look".into()),
        };
        assert_eq!(video.text(), Some("look"));
        assert_eq!(Content::Unsupported.text(), None);
    }

    #[test]
    fn test_message_builders() {
        let msg = InboundMessage::new(MessageId(1), Content::Text("x".into()))
            .in_batch("g1")
            .replying_to(MessageId(0));
        assert_eq!(msg.batch_id, Some(BatchId::new("g1")));
        assert_eq!(msg.reply_to, Some(MessageId(0)));
    }
}
