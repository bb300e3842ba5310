//! Type-safe identifier wrappers for the relay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate integer ID newtypes with common functionality.
macro_rules! define_int_id {
    ($(#[$meta:meta])* $name:ident, $inner:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(v: $inner) -> Self {
                Self(v)
            }
        }
    };
}

/// Macro to generate opaque string ID newtypes.
macro_rules! define_str_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from an existing string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_int_id!(
    /// Identity of an end user or administrator as assigned by the transport.
    UserId,
    i64
);

define_int_id!(
    /// A conversation (private chat or the administrator channel).
    ChatId,
    i64
);

define_int_id!(
    /// A message inside one chat.
    MessageId,
    i32
);

define_int_id!(
    /// Transport-assigned, increasing identifier of an inbound update.
    EventId,
    u64
);

define_str_id!(
    /// Opaque reference to an uploaded photo or video, reusable for re-sending.
    MediaRef
);

define_str_id!(
    /// Identifier shared by every item of a grouped media upload (album).
    BatchId
);

impl UserId {
    /// The private chat with this user.
    ///
    /// Private chats share their identifier with the user they belong to.
    pub fn private_chat(self) -> ChatId {
        ChatId(self.0)
    }
}

/// Reference to a message that was sent (or observed) in a specific chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationRef {
    /// Chat the message lives in.
    pub chat: ChatId,
    /// Message identifier within that chat.
    pub message: MessageId,
}

impl NotificationRef {
    /// Creates a new reference.
    pub fn new(chat: ChatId, message: MessageId) -> Self {
        Self { chat, message }
    }
}

impl fmt::Display for NotificationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat, self.message)
    }
}
