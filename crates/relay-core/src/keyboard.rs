//! Transport-neutral inline controls and the layouts the router uses.

use serde::{Deserialize, Serialize};

use crate::control::ControlAction;
use crate::ids::UserId;
use crate::settings::{Language, UserSettings};
use crate::stats::StatsPeriod;
use crate::texts;

/// One interactive button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    /// A button carrying an encoded control action.
    pub fn action(label: impl Into<String>, action: ControlAction) -> Self {
        Self {
            label: label.into(),
            payload: action.to_string(),
        }
    }
}

/// Rows of buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub rows: Vec<Vec<Button>>,
}

impl Controls {
    /// Creates controls from rows.
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// All payloads, row by row.
    #[cfg(test)]
    pub(crate) fn payloads(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.payload.as_str())
    }

    /// Whether any button carries `action`.
    #[cfg(test)]
    pub(crate) fn contains(&self, action: ControlAction) -> bool {
        let encoded = action.to_string();
        self.payloads().any(|p| p == encoded)
    }
}

/// "Block this user" control under a relayed notification.
pub fn block(lang: Language, user: UserId) -> Controls {
    Controls::new(vec![vec![Button::action(
        texts::label_block(lang),
        ControlAction::Ban(user),
    )]])
}

/// Confirm/cancel prompt for blocking.
pub fn confirm_block(lang: Language, user: UserId) -> Controls {
    Controls::new(vec![vec![
        Button::action(texts::label_confirm(lang), ControlAction::BanConfirm(user)),
        Button::action(texts::label_cancel(lang), ControlAction::BanCancel(user)),
    ]])
}

/// "Unblock this user" control.
pub fn unblock(lang: Language, user: UserId) -> Controls {
    Controls::new(vec![vec![Button::action(
        texts::label_unblock(lang),
        ControlAction::Unban(user),
    )]])
}

/// Confirm/cancel prompt for unblocking.
pub fn confirm_unblock(lang: Language, user: UserId) -> Controls {
    Controls::new(vec![vec![
        Button::action(texts::label_confirm(lang), ControlAction::UnbanConfirm(user)),
        Button::action(texts::label_cancel(lang), ControlAction::UnbanCancel(user)),
    ]])
}

/// Period selection menu, two periods per row.
pub fn stats_menu(lang: Language) -> Controls {
    let rows = StatsPeriod::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|&p| Button::action(texts::period_label(lang, p), ControlAction::Stats(p)))
                .collect()
        })
        .collect();
    Controls::new(rows)
}

/// Single "back" control under a statistics result.
pub fn stats_back(lang: Language) -> Controls {
    Controls::new(vec![vec![Button::action(
        texts::label_back(lang),
        ControlAction::StatsBack,
    )]])
}

/// Settings keyboard under the greeting.
pub fn settings(settings: &UserSettings) -> Controls {
    let lang = settings.language;
    Controls::new(vec![
        vec![Button::action(
            texts::toggle_anon_label(lang, settings.anonymous),
            ControlAction::ToggleAnon,
        )],
        vec![
            Button::action("🇷🇺 Русский", ControlAction::Language(Language::Ru)),
            Button::action("🇬🇧 English", ControlAction::Language(Language::En)),
        ],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_controls() {
        let controls = block(Language::En, UserId(9));
        assert!(controls.contains(ControlAction::Ban(UserId(9))));
        assert_eq!(controls.payloads().count(), 1);
    }

    #[test]
    fn test_confirm_controls() {
        let controls = confirm_unblock(Language::Ru, UserId(9));
        let payloads: Vec<_> = controls.payloads().collect();
        assert_eq!(payloads, vec!["unbanconfirm:9", "unbancancel:9"]);
    }

    #[test]
    fn test_stats_menu_layout() {
        let controls = stats_menu(Language::En);
        assert_eq!(controls.rows.len(), 2);
        let payloads: Vec<_> = controls.payloads().collect();
        assert_eq!(payloads, vec!["stats:day", "stats:week", "stats:month", "stats:all"]);
    }

    #[test]
    fn test_settings_controls() {
        let controls = settings(&UserSettings::default());
        assert!(controls.contains(ControlAction::ToggleAnon));
        assert!(controls.contains(ControlAction::Language(Language::En)));
    }
}
