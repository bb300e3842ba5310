//! Process configuration read from the environment.

use std::collections::HashSet;

use chrono::Duration;
use relay_core::{ChatId, Language, RelayConfig, UserId};
use url::Url;

use crate::error::{Result, TelegramError};

/// Default webhook path.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration of the Telegram relay process.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token.
    pub token: String,
    /// Routing configuration.
    pub relay: RelayConfig,
    /// Path the webhook endpoint is served on.
    pub webhook_path: String,
    /// Public base URL registered with Telegram, if any.
    pub webhook_url: Option<Url>,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl TelegramConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = get("BOT_TOKEN")
            .or_else(|| get("TELEGRAM_BOT_TOKEN"))
            .ok_or(TelegramError::NoToken)?;

        let admin_chat = get("ADMIN_CHAT_ID")
            .ok_or_else(|| TelegramError::InvalidConfig("ADMIN_CHAT_ID is required".into()))?;
        let admin_chat = parse_int("ADMIN_CHAT_ID", &admin_chat)?;

        let mut relay = RelayConfig::new(ChatId(admin_chat));

        if let Some(ids) = get("ADMIN_IDS") {
            relay = relay.with_admin_ids(parse_admin_ids(&ids)?);
        }
        if let Some(name) = get("RESPONDER_NAME") {
            relay = relay.with_responder_name(name);
        }
        if let Some(code) = get("ADMIN_LANGUAGE") {
            relay = relay.with_admin_language(code.parse::<Language>()?);
        }
        if let Some(secs) = get("COALESCE_WINDOW_SECS") {
            let secs = parse_int("COALESCE_WINDOW_SECS", &secs)?;
            if secs < 0 {
                return Err(TelegramError::InvalidConfig(
                    "COALESCE_WINDOW_SECS must not be negative".into(),
                ));
            }
            let window = Duration::try_seconds(secs).ok_or_else(|| {
                TelegramError::InvalidConfig(format!("COALESCE_WINDOW_SECS: {secs} is out of range"))
            })?;
            relay = relay.with_coalesce_window(window);
        }

        let webhook_path = get("WEBHOOK_PATH")
            .map(|p| if p.starts_with('/') { p } else { format!("/{p}") })
            .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string());

        let webhook_url = get("WEBHOOK_URL")
            .map(|u| Url::parse(&u).map_err(|e| TelegramError::InvalidConfig(format!("WEBHOOK_URL: {e}"))))
            .transpose()?;

        let port = match get("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| TelegramError::InvalidConfig(format!("PORT: invalid value {p:?}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            token,
            relay,
            webhook_path,
            webhook_url,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Socket address the webhook server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full public webhook URL, when a public base URL is configured.
    pub fn webhook_endpoint(&self) -> Result<Option<Url>> {
        let Some(base) = &self.webhook_url else {
            return Ok(None);
        };
        let full = format!("{}{}", base.as_str().trim_end_matches('/'), self.webhook_path);
        Url::parse(&full)
            .map(Some)
            .map_err(|e| TelegramError::InvalidConfig(format!("webhook endpoint: {e}")))
    }
}

fn parse_int(key: &str, raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| TelegramError::InvalidConfig(format!("{key}: expected an integer, got {raw:?}")))
}

fn parse_admin_ids(raw: &str) -> Result<HashSet<UserId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_int("ADMIN_IDS", s).map(UserId))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config() {
        let config = TelegramConfig::from_lookup(lookup(&[("BOT_TOKEN", "123:abc"), ("ADMIN_CHAT_ID", "-100500")]))
            .unwrap();

        assert_eq!(config.token, "123:abc");
        assert_eq!(config.relay.admin_chat, ChatId(-100500));
        assert!(config.relay.admin_ids.is_empty());
        assert_eq!(config.webhook_path, DEFAULT_WEBHOOK_PATH);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.webhook_endpoint().unwrap().is_none());
    }

    #[test]
    fn test_token_fallback() {
        let config =
            TelegramConfig::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t"), ("ADMIN_CHAT_ID", "1")])).unwrap();
        assert_eq!(config.token, "t");
    }

    #[test]
    fn test_missing_token() {
        let err = TelegramConfig::from_lookup(lookup(&[("ADMIN_CHAT_ID", "1"), ("BOT_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, TelegramError::NoToken));
    }

    #[test]
    fn test_missing_admin_chat() {
        let err = TelegramConfig::from_lookup(lookup(&[("BOT_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, TelegramError::InvalidConfig(_)));
    }

    #[test]
    fn test_full_config() {
        let config = TelegramConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "t"),
            ("ADMIN_CHAT_ID", "-1"),
            ("ADMIN_IDS", "10, 20,,30"),
            ("RESPONDER_NAME", "Support"),
            ("ADMIN_LANGUAGE", "en"),
            ("WEBHOOK_PATH", "hook"),
            ("WEBHOOK_URL", "https://relay.example.com/"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("COALESCE_WINDOW_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.relay.admin_ids.len(), 3);
        assert!(config.relay.is_admin(UserId(20)));
        assert!(!config.relay.is_admin(UserId(21)));
        assert_eq!(config.relay.responder_name, "Support");
        assert_eq!(config.relay.admin_language, Language::En);
        assert_eq!(config.relay.coalesce.window.num_seconds(), 30);
        assert_eq!(config.webhook_path, "/hook");
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(
            config.webhook_endpoint().unwrap().unwrap().as_str(),
            "https://relay.example.com/hook"
        );
    }

    #[test]
    fn test_invalid_values() {
        let base = [("BOT_TOKEN", "t"), ("ADMIN_CHAT_ID", "1")];

        let mut vars = base.to_vec();
        vars.push(("ADMIN_IDS", "1,x"));
        assert!(TelegramConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("ADMIN_LANGUAGE", "de"));
        let err = TelegramConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, TelegramError::Relay(_)));

        let mut vars = base.to_vec();
        vars.push(("PORT", "99999"));
        assert!(TelegramConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("WEBHOOK_URL", "not a url"));
        assert!(TelegramConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_coalesce_window_bounds() {
        let base = [("BOT_TOKEN", "t"), ("ADMIN_CHAT_ID", "1")];

        let mut vars = base.to_vec();
        vars.push(("COALESCE_WINDOW_SECS", "9223372036854775807"));
        let err = TelegramConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, TelegramError::InvalidConfig(_)));

        let mut vars = base.to_vec();
        vars.push(("COALESCE_WINDOW_SECS", "-5"));
        let err = TelegramConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, TelegramError::InvalidConfig(_)));

        let mut vars = base.to_vec();
        vars.push(("COALESCE_WINDOW_SECS", "0"));
        let config = TelegramConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.relay.coalesce.window.num_seconds(), 0);
    }

    #[test]
    fn test_port_override() {
        let config = TelegramConfig::from_lookup(lookup(&[("BOT_TOKEN", "t"), ("ADMIN_CHAT_ID", "1")]))
            .unwrap()
            .with_port(3000);
        assert_eq!(config.port, 3000);
    }
}
