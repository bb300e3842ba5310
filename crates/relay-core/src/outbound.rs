//! The outbound messaging collaborator.

use async_trait::async_trait;

use crate::error::Result;
use crate::ids::{ChatId, MediaRef, NotificationRef, UserId};
use crate::keyboard::Controls;

/// Identity data fetched from the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub display_name: Option<String>,
    pub handle: Option<String>,
}

/// Operations the router issues against the messaging transport.
///
/// Every call may fail; the router decides which failures are soft.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Sends a text message.
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        controls: Option<&Controls>,
    ) -> Result<NotificationRef>;

    /// Sends a photo by reference.
    async fn send_photo(
        &self,
        chat: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        controls: Option<&Controls>,
    ) -> Result<NotificationRef>;

    /// Sends a video by reference.
    async fn send_video(
        &self,
        chat: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        controls: Option<&Controls>,
    ) -> Result<NotificationRef>;

    /// Replaces the text (and controls) of a text message.
    async fn edit_text(
        &self,
        target: NotificationRef,
        text: &str,
        controls: Option<&Controls>,
    ) -> Result<()>;

    /// Replaces the caption (and controls) of a media message.
    async fn edit_caption(
        &self,
        target: NotificationRef,
        caption: &str,
        controls: Option<&Controls>,
    ) -> Result<()>;

    /// Replaces only the controls of a message. `None` removes them.
    async fn edit_controls(&self, target: NotificationRef, controls: Option<&Controls>) -> Result<()>;

    /// Pins a message in its chat.
    async fn pin(&self, target: NotificationRef) -> Result<()>;

    /// Looks up the current display name and handle of a user.
    async fn lookup_identity(&self, user: UserId) -> Result<Identity>;

    /// Answers a control activation, optionally with a transient notice.
    async fn answer_control(&self, callback_id: &str, notice: Option<&str>, alert: bool) -> Result<()>;
}
