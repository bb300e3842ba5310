//! Per-user settings: language, anonymity and the pinned status notification.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::ids::{NotificationRef, UserId};

/// Interface language of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    /// Returns the two-letter language code.
    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ru" => Ok(Language::Ru),
            "en" => Ok(Language::En),
            other => Err(RelayError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Settings record of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettings {
    /// Preferred interface language.
    pub language: Language,
    /// Whether relayed notifications hide the sender's identity.
    pub anonymous: bool,
    /// Pinned status notification in the user's private chat, if any.
    pub status_ref: Option<NotificationRef>,
}

/// Store of user settings, created lazily on first contact.
#[derive(Debug, Default)]
pub struct SettingsStore {
    users: HashMap<UserId, UserSettings>,
}

impl SettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the settings of a user, creating defaults on first access.
    pub fn get(&mut self, user: UserId) -> UserSettings {
        self.users.entry(user).or_default().clone()
    }

    /// Returns the settings of a user without creating a record.
    pub fn peek(&self, user: UserId) -> Option<&UserSettings> {
        self.users.get(&user)
    }

    /// Sets the language from a language code.
    ///
    /// Unknown codes are rejected and leave the record untouched.
    pub fn set_language(&mut self, user: UserId, code: &str) -> crate::Result<Language> {
        let language: Language = code.parse()?;
        self.users.entry(user).or_default().language = language;
        Ok(language)
    }

    /// Sets the anonymity flag.
    pub fn set_anonymous(&mut self, user: UserId, anonymous: bool) {
        self.users.entry(user).or_default().anonymous = anonymous;
    }

    /// Flips the anonymity flag and returns the new value.
    pub fn toggle_anonymous(&mut self, user: UserId) -> bool {
        let settings = self.users.entry(user).or_default();
        settings.anonymous = !settings.anonymous;
        settings.anonymous
    }

    /// Records the pinned status notification of a user.
    pub fn set_status_ref(&mut self, user: UserId, status: NotificationRef) {
        self.users.entry(user).or_default().status_ref = Some(status);
    }

    /// Number of known users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ChatId, MessageId};

    #[test]
    fn test_get_creates_defaults() {
        let mut store = SettingsStore::new();
        assert!(store.peek(UserId(1)).is_none());

        let settings = store.get(UserId(1));
        assert_eq!(settings.language, Language::Ru);
        assert!(!settings.anonymous);
        assert!(settings.status_ref.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_language() {
        let mut store = SettingsStore::new();
        assert_eq!(store.set_language(UserId(1), "en").unwrap(), Language::En);
        assert_eq!(store.get(UserId(1)).language, Language::En);
    }

    #[test]
    fn test_unknown_language_rejected_without_mutation() {
        let mut store = SettingsStore::new();
        store.set_language(UserId(1), "en").unwrap();

        let err = store.set_language(UserId(1), "de").unwrap_err();
        assert!(matches!(err, RelayError::UnknownLanguage(ref c) if c == "de"));
        assert_eq!(store.get(UserId(1)).language, Language::En);

        assert!(store.set_language(UserId(2), "fr").is_err());
        assert!(store.peek(UserId(2)).is_none());
    }

    #[test]
    fn test_toggle_anonymous() {
        let mut store = SettingsStore::new();
        assert!(store.toggle_anonymous(UserId(5)));
        assert!(store.get(UserId(5)).anonymous);
        assert!(!store.toggle_anonymous(UserId(5)));

        store.set_anonymous(UserId(5), true);
        assert!(store.get(UserId(5)).anonymous);
    }

    #[test]
    fn test_status_ref() {
        let mut store = SettingsStore::new();
        let status = NotificationRef::new(ChatId(5), MessageId(10));
        store.set_status_ref(UserId(5), status);
        assert_eq!(store.get(UserId(5)).status_ref, Some(status));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Ru.code(), "ru");
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert!("EN".parse::<Language>().is_err());
    }
}
