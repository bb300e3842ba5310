//! Localized message templates (Telegram HTML subset).

use crate::event::{ContentKind, Sender};
use crate::ids::UserId;
use crate::moderation::AuditInfo;
use crate::settings::{Language, UserSettings};
use crate::stats::{StatsPeriod, StatsSummary};

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn pick(lang: Language, ru: &'static str, en: &'static str) -> &'static str {
    match lang {
        Language::Ru => ru,
        Language::En => en,
    }
}

// --- User-facing ---

pub fn greeting(lang: Language) -> String {
    pick(
        lang,
        "👋 Здравствуйте! Напишите сообщение, и администраторы его получат.\n\n\
        Можно отправлять текст, фото и видео. Настройки ниже.",
        "👋 Hello! Send a message and the administrators will receive it.\n\n\
        Text, photos and videos are supported. Settings are below.",
    )
    .to_string()
}

pub fn status(settings: &UserSettings) -> String {
    let lang = settings.language;
    let language = pick(lang, "🇷🇺 Русский", "🇬🇧 English");
    let anonymity = if settings.anonymous {
        pick(lang, "включена", "on")
    } else {
        pick(lang, "выключена", "off")
    };
    match lang {
        Language::Ru => format!("⚙️ <b>Статус</b>\nЯзык: {language}\nАнонимность: {anonymity}"),
        Language::En => format!("⚙️ <b>Status</b>\nLanguage: {language}\nAnonymity: {anonymity}"),
    }
}

pub fn anonymity_changed(lang: Language, anonymous: bool) -> String {
    match (lang, anonymous) {
        (Language::Ru, true) => "🕶 Анонимность включена. Ваше имя не будет видно.",
        (Language::Ru, false) => "👤 Анонимность выключена.",
        (Language::En, true) => "🕶 Anonymity is on. Your name will be hidden.",
        (Language::En, false) => "👤 Anonymity is off.",
    }
    .to_string()
}

/// Plain-text notice after a language switch, in the new language.
pub fn language_changed(lang: Language) -> String {
    pick(lang, "🇷🇺 Язык: русский", "🇬🇧 Language: English").to_string()
}

pub fn toggle_anon_label(lang: Language, anonymous: bool) -> &'static str {
    match (lang, anonymous) {
        (Language::Ru, false) => "🕶 Включить анонимность",
        (Language::Ru, true) => "👤 Выключить анонимность",
        (Language::En, false) => "🕶 Go anonymous",
        (Language::En, true) => "👤 Show my name",
    }
}

pub fn delivered(lang: Language) -> &'static str {
    pick(lang, "✅ Сообщение отправлено.", "✅ Message delivered.")
}

pub fn blocked_notice(lang: Language) -> &'static str {
    pick(
        lang,
        "⛔ Вы заблокированы и не можете отправлять сообщения.",
        "⛔ You have been blocked and cannot send messages.",
    )
}

pub fn unsupported(lang: Language) -> &'static str {
    pick(
        lang,
        "⚠️ Поддерживаются только текст, фото и видео.",
        "⚠️ Only text, photos and videos are supported.",
    )
}

pub fn reply(lang: Language, responder: &str, body: Option<&str>) -> String {
    let header = match lang {
        Language::Ru => format!("💬 <b>Ответ от {}</b>", html_escape(responder)),
        Language::En => format!("💬 <b>Reply from {}</b>", html_escape(responder)),
    };
    match body {
        Some(body) if !body.is_empty() => format!("{header}\n\n{}", html_escape(body)),
        _ => header,
    }
}

pub fn reply_placeholder(lang: Language, responder: &str) -> String {
    let note = pick(
        lang,
        "(вложение этого типа не может быть доставлено)",
        "(an attachment of this type could not be delivered)",
    );
    format!("{}\n\n<i>{note}</i>", reply(lang, responder, None))
}

// --- Administrator-facing ---

fn kind_label(lang: Language, kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Text => pick(lang, "💬 Сообщение", "💬 Message"),
        ContentKind::Photo => pick(lang, "🖼 Фото", "🖼 Photo"),
        ContentKind::Video => pick(lang, "🎬 Видео", "🎬 Video"),
    }
}

/// Renders a relayed notification.
///
/// Anonymous notifications carry no name, handle or identifier.
pub fn relay(lang: Language, sender: &Sender, anonymous: bool, kind: ContentKind, body: Option<&str>) -> String {
    let label = kind_label(lang, kind);
    let mut text = if anonymous {
        format!("{label} <b>{}</b>", pick(lang, "от анонима", "from anonymous"))
    } else {
        let mut who = format!("{label} <b>{}</b>", html_escape(&sender.display_name));
        if let Some(handle) = &sender.handle {
            who.push_str(&format!(" (@{})", html_escape(handle)));
        }
        who.push_str(&format!("\n🆔 <code>{}</code>", sender.id));
        who
    };
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        text.push_str("\n\n");
        text.push_str(&html_escape(body));
    }
    text
}

/// Renders an addendum block appended to a relayed notification.
pub fn addendum(lang: Language, body: &str) -> String {
    format!(
        "\n\n➕ <b>{}</b>\n{}",
        pick(lang, "Дополнение", "Addendum"),
        html_escape(body)
    )
}

/// Escapes `body` and splits it into pieces of at most `limit` characters.
///
/// Entities produced by escaping are never split between pieces.
pub fn split_escaped(body: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    for c in body.chars() {
        let mut buf = [0u8; 4];
        let escaped: &str = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            _ => c.encode_utf8(&mut buf),
        };
        let len = escaped.chars().count();
        if width + len > limit && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            width = 0;
        }
        current.push_str(escaped);
        width += len;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

pub fn reply_sent(lang: Language) -> &'static str {
    pick(lang, "✅ Ответ отправлен.", "✅ Reply sent.")
}

pub fn reply_failed(lang: Language) -> &'static str {
    pick(
        lang,
        "⚠️ Не удалось доставить ответ.",
        "⚠️ The reply could not be delivered.",
    )
}

pub fn reply_suppressed(lang: Language, user: UserId) -> String {
    match lang {
        Language::Ru => format!("⛔ Пользователь <code>{user}</code> заблокирован, ответ не отправлен."),
        Language::En => format!("⛔ User <code>{user}</code> is blocked, the reply was not sent."),
    }
}

pub fn blocked_list_header(lang: Language, count: usize) -> String {
    match lang {
        Language::Ru => format!("⛔ <b>Заблокированные пользователи</b>: {count}"),
        Language::En => format!("⛔ <b>Blocked users</b>: {count}"),
    }
}

pub fn blocked_list_empty(lang: Language) -> &'static str {
    pick(lang, "Заблокированных пользователей нет.", "No users are blocked.")
}

pub fn blocked_entry(lang: Language, user: UserId, audit: Option<&AuditInfo>) -> String {
    let mut text = format!("🆔 <code>{user}</code>");
    if let Some(audit) = audit {
        if let Some(name) = &audit.display_name {
            text.push_str(&format!("\n👤 {}", html_escape(name)));
        }
        if let Some(handle) = &audit.handle {
            text.push_str(&format!(" (@{})", html_escape(handle)));
        }
        text.push_str(&format!(
            "\n🕒 {} {}",
            pick(lang, "с", "since"),
            audit.blocked_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    text
}

pub fn stats_menu(lang: Language) -> &'static str {
    pick(lang, "📊 <b>Статистика</b>\nВыберите период:", "📊 <b>Statistics</b>\nChoose a period:")
}

pub fn period_label(lang: Language, period: StatsPeriod) -> &'static str {
    match period {
        StatsPeriod::Day => pick(lang, "Сутки", "Day"),
        StatsPeriod::Week => pick(lang, "Неделя", "Week"),
        StatsPeriod::Month => pick(lang, "Месяц", "Month"),
        StatsPeriod::All => pick(lang, "Всё время", "All time"),
    }
}

pub fn stats_result(lang: Language, period: StatsPeriod, s: &StatsSummary) -> String {
    let title = period_label(lang, period);
    match lang {
        Language::Ru => format!(
            "📊 <b>Статистика: {title}</b>\n\n\
            Сообщений: {}\nПользователей: {}\n\
            Текст: {}\nФото: {}\nВидео: {}\nАнонимных отправителей: {}",
            s.total, s.unique_users, s.texts, s.photos, s.videos, s.anonymous_senders
        ),
        Language::En => format!(
            "📊 <b>Statistics: {title}</b>\n\n\
            Messages: {}\nUsers: {}\n\
            Text: {}\nPhotos: {}\nVideos: {}\nAnonymous senders: {}",
            s.total, s.unique_users, s.texts, s.photos, s.videos, s.anonymous_senders
        ),
    }
}

pub fn admin_help(lang: Language) -> &'static str {
    pick(
        lang,
        "<b>Команды администратора</b>\n\
        /banned — заблокированные пользователи\n\
        /stats — статистика\n\
        /help — эта справка\n\n\
        Ответьте на пересланное сообщение, чтобы ответить пользователю.",
        "<b>Administrator commands</b>\n\
        /banned — blocked users\n\
        /stats — statistics\n\
        /help — this help\n\n\
        Reply to a relayed message to answer the user.",
    )
}

// --- Control labels and alerts ---

pub fn label_block(lang: Language) -> &'static str {
    pick(lang, "⛔ Заблокировать", "⛔ Block")
}

pub fn label_unblock(lang: Language) -> &'static str {
    pick(lang, "✅ Разблокировать", "✅ Unblock")
}

pub fn label_confirm(lang: Language) -> &'static str {
    pick(lang, "✔️ Подтвердить", "✔️ Confirm")
}

pub fn label_cancel(lang: Language) -> &'static str {
    pick(lang, "✖️ Отмена", "✖️ Cancel")
}

pub fn label_back(lang: Language) -> &'static str {
    pick(lang, "⬅️ Назад", "⬅️ Back")
}

pub fn alert_blocked(lang: Language) -> &'static str {
    pick(lang, "Пользователь заблокирован", "User blocked")
}

pub fn alert_unblocked(lang: Language) -> &'static str {
    pick(lang, "Пользователь разблокирован", "User unblocked")
}

pub fn alert_cancelled(lang: Language) -> &'static str {
    pick(lang, "Отменено", "Cancelled")
}

pub fn alert_expired(lang: Language) -> &'static str {
    pick(lang, "Действие устарело", "This action has expired")
}

pub fn alert_invalid(lang: Language) -> &'static str {
    pick(lang, "Некорректное действие", "Invalid action")
}

pub fn alert_forbidden(lang: Language) -> &'static str {
    pick(lang, "Недостаточно прав", "Not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sender() -> Sender {
        Sender::new(UserId(77), "Ann <3").with_handle("ann")
    }

    #[test]
    fn test_attributed_relay_has_identity() {
        let text = relay(Language::En, &sender(), false, ContentKind::Text, Some("Hello"));
        assert!(text.contains("Ann &lt;3"));
        assert!(text.contains("@ann"));
        assert!(text.contains("<code>77</code>"));
        assert!(text.ends_with("Hello"));
    }

    #[test]
    fn test_anonymous_relay_hides_identity() {
        let text = relay(Language::En, &sender(), true, ContentKind::Photo, Some("pic"));
        assert!(!text.contains("Ann"));
        assert!(!text.contains("ann"));
        assert!(!text.contains("77"));
        assert!(text.contains("pic"));
    }

    #[test]
    fn test_reply_escapes_body() {
        let text = reply(Language::En, "Support", Some("a < b"));
        assert!(text.contains("Reply from Support"));
        assert!(text.ends_with("a &lt; b"));
        assert!(!reply(Language::Ru, "Support", None).contains("\n\n"));
    }

    #[test]
    fn test_blocked_entry_with_audit() {
        let audit = AuditInfo {
            blocked_at: Utc::now(),
            display_name: Some("Bob".into()),
            handle: None,
        };
        let text = blocked_entry(Language::En, UserId(5), Some(&audit));
        assert!(text.contains("<code>5</code>"));
        assert!(text.contains("Bob"));
        assert!(!text.contains('@'));
        assert_eq!(blocked_entry(Language::En, UserId(5), None), "🆔 <code>5</code>");
    }

    #[test]
    fn test_status_reflects_settings() {
        let settings = UserSettings {
            language: Language::En,
            anonymous: true,
            status_ref: None,
        };
        let text = status(&settings);
        assert!(text.contains("English"));
        assert!(text.contains("Anonymity: on"));
    }

    #[test]
    fn test_split_escaped_keeps_entities_whole() {
        let pieces = split_escaped("a<b&c", 5);
        assert_eq!(pieces, vec!["a&lt;", "b", "&amp;", "c"]);

        let long = "<".repeat(2000);
        let pieces = split_escaped(&long, 4096);
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(|p| p.chars().count() <= 4096));
        assert_eq!(pieces.concat(), html_escape(&long));
    }

    #[test]
    fn test_split_escaped_counts_characters() {
        let pieces = split_escaped(&"ж".repeat(10), 4);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[2], "жж");
        assert!(split_escaped("", 10).is_empty());
    }
}
