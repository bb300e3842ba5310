//! Routing of events from users' private chats.

use tracing::{debug, info, warn};

use super::{parse_command, Routing};
use crate::control::ControlAction;
use crate::conversation::{LastRelay, CAPTION_LIMIT, TEXT_LIMIT};
use crate::event::{Content, ContentKind, ControlActivation, InboundMessage, Payload, Sender};
use crate::ids::{NotificationRef, UserId};
use crate::keyboard::{self, Controls};
use crate::moderation::ModerationAction;
use crate::settings::UserSettings;
use crate::stats::StatsEvent;
use crate::texts;

impl Routing<'_> {
    pub(super) async fn route_private(&mut self, sender: &Sender, payload: Payload) {
        match payload {
            Payload::Message(message) => self.user_message(sender, message).await,
            Payload::Control(control) => self.user_control(sender.id, control).await,
        }
    }

    async fn user_message(&mut self, sender: &Sender, message: InboundMessage) {
        let user = sender.id;
        let settings = self.state.settings.get(user);
        let chat = user.private_chat();

        if let Content::Text(text) = &message.content {
            if let Some(command) = parse_command(text) {
                match command {
                    "start" => self.start(user).await,
                    "anon" => self.toggle_anonymity_command(user).await,
                    other => debug!(user_id = %user, command = other, "Ignoring unknown command"),
                }
                return;
            }
        }

        if self.state.moderation.is_blocked(user) {
            info!(user_id = %user, "Rejecting message from blocked user");
            self.notify(chat, texts::blocked_notice(settings.language), None).await;
            return;
        }

        let Some(kind) = message.content.kind() else {
            debug!(user_id = %user, "Rejecting unsupported content");
            self.notify(chat, texts::unsupported(settings.language), None).await;
            return;
        };

        if let Some(batch) = &message.batch_id {
            if self.state.conversations.is_batch_acknowledged(batch) {
                self.relay_batch_item(user, &message.content).await;
                return;
            }
            self.state.conversations.acknowledge_batch(batch.clone());
        }

        self.state.stats.append(StatsEvent {
            user,
            at: self.now,
            kind,
            anonymous: settings.anonymous,
        });

        let relayed = match &message.content {
            Content::Text(text) => self.relay_text(sender, &settings, text).await,
            content => self.relay_media(sender, &settings, content, kind).await,
        };

        if relayed {
            self.notify(chat, texts::delivered(settings.language), None).await;
        }
    }

    /// Appends to the last notification when possible, otherwise relays anew.
    async fn relay_text(&mut self, sender: &Sender, settings: &UserSettings, text: &str) -> bool {
        let user = sender.id;
        let lang = self.config.admin_language;

        let target = self
            .state
            .conversations
            .coalesce_target(user, self.now, settings.anonymous, &self.config.coalesce)
            .cloned();

        if let Some(last) = target {
            let combined = format!("{}{}", last.text, texts::addendum(lang, text));
            if last.fits(&combined) {
                let controls = self.relay_controls(last.notification, user);
                let edited = if last.has_media {
                    self.out.edit_caption(last.notification, &combined, Some(&controls)).await
                } else {
                    self.out.edit_text(last.notification, &combined, Some(&controls)).await
                };
                match edited {
                    Ok(()) => {
                        debug!(user_id = %user, notification = %last.notification, "Appended to notification");
                        self.state.conversations.record_append(user, combined, self.now);
                        return true;
                    }
                    Err(e) => {
                        warn!(user_id = %user, error = %e, "Failed to extend notification, relaying anew");
                    }
                }
            }
        }

        let body = texts::relay(lang, sender, settings.anonymous, ContentKind::Text, Some(text));
        let overflow = body.chars().count() > TEXT_LIMIT;
        let body = if overflow {
            texts::relay(lang, sender, settings.anonymous, ContentKind::Text, None)
        } else {
            body
        };
        let controls = keyboard::block(lang, user);
        match self.out.send_text(self.config.admin_chat, &body, Some(&controls)).await {
            Ok(note) => {
                self.remember_relay(user, note, body, false, settings.anonymous);
                if overflow {
                    self.relay_overflow(user, text, settings.anonymous).await;
                }
                true
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "Failed to relay message");
                false
            }
        }
    }

    async fn relay_media(
        &mut self,
        sender: &Sender,
        settings: &UserSettings,
        content: &Content,
        kind: ContentKind,
    ) -> bool {
        let user = sender.id;
        let lang = self.config.admin_language;
        let caption = texts::relay(lang, sender, settings.anonymous, kind, content.text());
        let overflow = caption.chars().count() > CAPTION_LIMIT;
        let caption = if overflow {
            texts::relay(lang, sender, settings.anonymous, kind, None)
        } else {
            caption
        };
        let controls = keyboard::block(lang, user);
        let admin_chat = self.config.admin_chat;

        let sent = match content {
            Content::Photo { media, .. } => {
                self.out.send_photo(admin_chat, media, Some(caption.as_str()), Some(&controls)).await
            }
            Content::Video { media, .. } => {
                self.out.send_video(admin_chat, media, Some(caption.as_str()), Some(&controls)).await
            }
            _ => return false,
        };

        match sent {
            Ok(note) => {
                self.remember_relay(user, note, caption, true, settings.anonymous);
                if let Some(text) = content.text().filter(|_| overflow) {
                    self.relay_overflow(user, text, settings.anonymous).await;
                }
                true
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "Failed to relay media");
                false
            }
        }
    }

    /// Sends a body too long for one notification as follow-up messages.
    ///
    /// Each part is bound for replies; the last one becomes the coalescing target.
    async fn relay_overflow(&mut self, user: UserId, body: &str, anonymous: bool) {
        let admin_chat = self.config.admin_chat;
        for part in texts::split_escaped(body, TEXT_LIMIT) {
            match self.out.send_text(admin_chat, &part, None).await {
                Ok(note) => {
                    self.state.conversations.bind_reply(note, user);
                    self.state
                        .conversations
                        .set_last_relay(user, LastRelay::new(note, part, self.now, false, anonymous));
                }
                Err(e) => {
                    warn!(user_id = %user, error = %e, "Failed to relay message continuation");
                    return;
                }
            }
        }
        debug!(user_id = %user, "Relayed long message in parts");
    }

    /// Controls for an extended notification, keeping an open confirmation prompt.
    fn relay_controls(&self, notification: NotificationRef, user: UserId) -> Controls {
        let lang = self.config.admin_language;
        match self.state.pending.pending_on(notification) {
            Some((ModerationAction::Block, target)) => keyboard::confirm_block(lang, target),
            Some((ModerationAction::Unblock, target)) => keyboard::confirm_unblock(lang, target),
            None => keyboard::block(lang, user),
        }
    }

    /// Relays a later item of an already announced batch as bare media.
    async fn relay_batch_item(&mut self, user: UserId, content: &Content) {
        let admin_chat = self.config.admin_chat;
        let sent = match content {
            Content::Photo { media, .. } => self.out.send_photo(admin_chat, media, None, None).await,
            Content::Video { media, .. } => self.out.send_video(admin_chat, media, None, None).await,
            _ => {
                debug!(user_id = %user, "Ignoring non-media batch item");
                return;
            }
        };
        match sent {
            Ok(note) => self.state.conversations.bind_reply(note, user),
            Err(e) => warn!(user_id = %user, error = %e, "Failed to relay batch item"),
        }
    }

    fn remember_relay(&mut self, user: UserId, note: NotificationRef, text: String, has_media: bool, anonymous: bool) {
        info!(user_id = %user, notification = %note, anonymous, "Relayed message");
        self.state.conversations.bind_reply(note, user);
        self.state
            .conversations
            .set_last_relay(user, LastRelay::new(note, text, self.now, has_media, anonymous));
    }

    // --- Settings ---

    async fn start(&mut self, user: UserId) {
        let settings = self.state.settings.get(user);
        let controls = keyboard::settings(&settings);
        self.notify(user.private_chat(), &texts::greeting(settings.language), Some(&controls))
            .await;
        self.refresh_status(user).await;
    }

    async fn toggle_anonymity_command(&mut self, user: UserId) {
        let anonymous = self.state.settings.toggle_anonymous(user);
        let lang = self.state.settings.get(user).language;
        info!(user_id = %user, anonymous, "Anonymity toggled");
        self.notify(user.private_chat(), &texts::anonymity_changed(lang, anonymous), None)
            .await;
        self.refresh_status(user).await;
    }

    async fn user_control(&mut self, user: UserId, control: ControlActivation) {
        let lang = self.state.settings.get(user).language;

        let action = match control.data.parse::<ControlAction>() {
            Ok(action) => action,
            Err(e) => {
                warn!(user_id = %user, error = %e, "Invalid control payload");
                self.answer(&control.callback_id, Some(texts::alert_invalid(lang)), true).await;
                return;
            }
        };

        let notice = match action {
            ControlAction::ToggleAnon => {
                let anonymous = self.state.settings.toggle_anonymous(user);
                info!(user_id = %user, anonymous, "Anonymity toggled");
                texts::anonymity_changed(lang, anonymous)
            }
            ControlAction::Language(language) => {
                if let Err(e) = self.state.settings.set_language(user, language.code()) {
                    warn!(user_id = %user, error = %e, "Failed to set language");
                    self.answer(&control.callback_id, Some(texts::alert_invalid(lang)), true).await;
                    return;
                }
                info!(user_id = %user, language = %language, "Language changed");
                texts::language_changed(language)
            }
            _ => {
                debug!(user_id = %user, action = %action, "Administrator control outside the administrator channel");
                self.answer(&control.callback_id, Some(texts::alert_forbidden(lang)), true).await;
                return;
            }
        };

        if let Some(origin) = control.origin {
            self.rerender_greeting(user, origin).await;
        }
        self.answer(&control.callback_id, Some(notice.as_str()), false).await;
        self.refresh_status(user).await;
    }

    /// Re-renders the greeting the settings controls are attached to.
    async fn rerender_greeting(&mut self, user: UserId, origin: NotificationRef) {
        let settings = self.state.settings.get(user);
        let controls = keyboard::settings(&settings);
        let greeting = texts::greeting(settings.language);
        if let Err(e) = self.out.edit_text(origin, &greeting, Some(&controls)).await {
            warn!(user_id = %user, error = %e, "Greeting edit failed, replacing controls only");
            self.swap_controls(origin, &controls).await;
        }
    }

    /// Edits the user's status message in place, or sends and pins a new one.
    async fn refresh_status(&mut self, user: UserId) {
        let settings = self.state.settings.get(user);
        let text = texts::status(&settings);

        if let Some(status) = settings.status_ref {
            match self.out.edit_text(status, &text, None).await {
                Ok(()) => return,
                Err(e) => warn!(user_id = %user, error = %e, "Status edit failed, sending a new one"),
            }
        }

        let Some(note) = self.notify(user.private_chat(), &text, None).await else {
            return;
        };
        self.state.settings.set_status_ref(user, note);
        if let Err(e) = self.out.pin(note).await {
            warn!(user_id = %user, error = %e, "Failed to pin status message");
        }
    }
}
