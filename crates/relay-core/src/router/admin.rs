//! Routing of events from the administrator channel.

use tracing::{debug, info, warn};

use super::{parse_command, Routing};
use crate::control::ControlAction;
use crate::event::{Content, ControlActivation, InboundMessage, Payload, Sender};
use crate::ids::{MessageId, NotificationRef, UserId};
use crate::keyboard;
use crate::moderation::{AuditInfo, Decision, ModerationAction, Resolution};
use crate::texts;

impl Routing<'_> {
    pub(super) async fn route_admin(&mut self, sender: &Sender, payload: Payload) {
        match payload {
            Payload::Message(message) => {
                if !self.config.is_admin(sender.id) {
                    debug!(user_id = %sender.id, "Ignoring message from non-administrator");
                    return;
                }
                self.admin_message(message).await;
            }
            Payload::Control(control) => self.admin_control(sender.id, control).await,
        }
    }

    /// Commands run even when sent as a reply; they are never relayed to users.
    async fn admin_message(&mut self, message: InboundMessage) {
        let command = match &message.content {
            Content::Text(text) => parse_command(text),
            _ => None,
        };

        let Some(command) = command else {
            if let Some(reply_to) = message.reply_to {
                self.admin_reply(reply_to, &message.content).await;
            }
            return;
        };

        match command {
            "banned" => self.list_blocked().await,
            "stats" => {
                let lang = self.config.admin_language;
                let controls = keyboard::stats_menu(lang);
                self.notify(self.config.admin_chat, texts::stats_menu(lang), Some(&controls))
                    .await;
            }
            "help" => {
                self.notify(self.config.admin_chat, texts::admin_help(self.config.admin_language), None)
                    .await;
            }
            other => debug!(command = other, "Ignoring unknown administrator command"),
        }
    }

    /// Delivers an administrator reply to the user bound to `reply_to`.
    async fn admin_reply(&mut self, reply_to: MessageId, content: &Content) {
        let admin_chat = self.config.admin_chat;
        let admin_lang = self.config.admin_language;
        let notification = NotificationRef::new(admin_chat, reply_to);

        let Some(user) = self.state.conversations.resolve_reply(notification) else {
            debug!(notification = %notification, "Reply to an unbound message");
            return;
        };

        if self.state.moderation.is_blocked(user) {
            info!(user_id = %user, "Suppressing reply to blocked user");
            self.notify(admin_chat, &texts::reply_suppressed(admin_lang, user), None)
                .await;
            return;
        }

        let lang = self.state.settings.get(user).language;
        let responder = self.config.responder_name.as_str();
        let chat = user.private_chat();

        let delivered = match content {
            Content::Text(text) => {
                let body = texts::reply(lang, responder, Some(text));
                self.out.send_text(chat, &body, None).await
            }
            Content::Photo { media, caption } => {
                let caption = texts::reply(lang, responder, caption.as_deref());
                self.out.send_photo(chat, media, Some(caption.as_str()), None).await
            }
            Content::Video { media, caption } => {
                let caption = texts::reply(lang, responder, caption.as_deref());
                self.out.send_video(chat, media, Some(caption.as_str()), None).await
            }
            Content::Unsupported => {
                let body = texts::reply_placeholder(lang, responder);
                self.out.send_text(chat, &body, None).await
            }
        };

        match delivered {
            Ok(_) => {
                info!(user_id = %user, "Delivered administrator reply");
                self.notify(admin_chat, texts::reply_sent(admin_lang), None).await;
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "Failed to deliver administrator reply");
                self.notify(admin_chat, texts::reply_failed(admin_lang), None).await;
            }
        }
    }

    /// One message per blocked user, each carrying its own unblock control.
    async fn list_blocked(&mut self) {
        let lang = self.config.admin_language;
        let admin_chat = self.config.admin_chat;
        let blocked = self.state.moderation.list_blocked();

        if blocked.is_empty() {
            self.notify(admin_chat, texts::blocked_list_empty(lang), None).await;
            return;
        }

        self.notify(admin_chat, &texts::blocked_list_header(lang, blocked.len()), None)
            .await;
        for user in blocked {
            let entry = texts::blocked_entry(lang, user, self.state.moderation.audit_of(user));
            let controls = keyboard::unblock(lang, user);
            self.notify(admin_chat, &entry, Some(&controls)).await;
        }
    }

    async fn admin_control(&mut self, actor: UserId, control: ControlActivation) {
        let lang = self.config.admin_language;
        let callback = control.callback_id.as_str();

        let action = match control.data.parse::<ControlAction>() {
            Ok(action) if action.is_admin_action() => action,
            Ok(action) => {
                debug!(action = %action, "User control in the administrator channel");
                self.answer(callback, Some(texts::alert_invalid(lang)), true).await;
                return;
            }
            Err(e) => {
                warn!(error = %e, "Invalid control payload");
                self.answer(callback, Some(texts::alert_invalid(lang)), true).await;
                return;
            }
        };

        if !self.config.is_admin(actor) {
            info!(user_id = %actor, action = %action, "Rejecting control from non-administrator");
            self.answer(callback, Some(texts::alert_forbidden(lang)), true).await;
            return;
        }

        let Some(origin) = control.origin else {
            self.answer(callback, Some(texts::alert_expired(lang)), true).await;
            return;
        };

        if let Some((kind, user, decision)) = action.moderation() {
            self.moderate(callback, origin, kind, user, decision).await;
            return;
        }

        match action {
            ControlAction::Stats(period) => {
                let summary = self.state.stats.summarize(period, self.now);
                let text = texts::stats_result(lang, period, &summary);
                let controls = keyboard::stats_back(lang);
                if let Err(e) = self.out.edit_text(origin, &text, Some(&controls)).await {
                    warn!(error = %e, "Failed to show statistics");
                }
                self.answer(callback, None, false).await;
            }
            ControlAction::StatsBack => {
                let controls = keyboard::stats_menu(lang);
                if let Err(e) = self.out.edit_text(origin, texts::stats_menu(lang), Some(&controls)).await {
                    warn!(error = %e, "Failed to show statistics menu");
                }
                self.answer(callback, None, false).await;
            }
            _ => self.answer(callback, Some(texts::alert_invalid(lang)), true).await,
        }
    }

    /// Drives the block/unblock confirmation flow attached to `origin`.
    async fn moderate(
        &mut self,
        callback: &str,
        origin: NotificationRef,
        kind: ModerationAction,
        user: UserId,
        decision: Option<Decision>,
    ) {
        let lang = self.config.admin_language;

        let Some(decision) = decision else {
            self.state.pending.begin(origin, kind, user);
            let prompt = match kind {
                ModerationAction::Block => keyboard::confirm_block(lang, user),
                ModerationAction::Unblock => keyboard::confirm_unblock(lang, user),
            };
            self.swap_controls(origin, &prompt).await;
            self.answer(callback, None, false).await;
            return;
        };

        let Some(resolution) = self.state.pending.resolve(origin, kind, user, decision) else {
            debug!(origin = %origin, user_id = %user, "Stale confirmation");
            self.answer(callback, Some(texts::alert_expired(lang)), true).await;
            return;
        };

        match (resolution, kind) {
            (Resolution::Cancelled, ModerationAction::Block) => {
                self.swap_controls(origin, &keyboard::block(lang, user)).await;
                self.answer(callback, Some(texts::alert_cancelled(lang)), false).await;
            }
            (Resolution::Cancelled, ModerationAction::Unblock) => {
                self.swap_controls(origin, &keyboard::unblock(lang, user)).await;
                self.answer(callback, Some(texts::alert_cancelled(lang)), false).await;
            }
            (Resolution::Applied, ModerationAction::Block) => {
                let audit = self.audit_for(user).await;
                self.state.moderation.block(user, audit);
                info!(user_id = %user, "User blocked");
                self.swap_controls(origin, &keyboard::unblock(lang, user)).await;
                self.answer(callback, Some(texts::alert_blocked(lang)), false).await;
            }
            (Resolution::Applied, ModerationAction::Unblock) => {
                self.state.moderation.unblock(user);
                info!(user_id = %user, "User unblocked");
                self.swap_controls(origin, &keyboard::block(lang, user)).await;
                self.answer(callback, Some(texts::alert_unblocked(lang)), false).await;
            }
        }
    }

    /// Audit record for a block, with identity data when the lookup succeeds.
    async fn audit_for(&self, user: UserId) -> AuditInfo {
        let mut audit = AuditInfo::bare(self.now);
        match self.out.lookup_identity(user).await {
            Ok(identity) => {
                audit.display_name = identity.display_name;
                audit.handle = identity.handle;
            }
            Err(e) => warn!(user_id = %user, error = %e, "Identity lookup failed"),
        }
        audit
    }
}
