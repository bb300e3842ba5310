//! Payload codec for interactive controls.
//!
//! Payloads are short colon-delimited strings such as `ban:42` or `stats:week`.
//! They round-trip through the transport unchanged, so the format is stable.

use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;
use crate::ids::UserId;
use crate::moderation::{Decision, ModerationAction};
use crate::settings::Language;
use crate::stats::StatsPeriod;

/// A decoded control payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Ask for confirmation to block a user.
    Ban(UserId),
    BanConfirm(UserId),
    BanCancel(UserId),
    /// Ask for confirmation to unblock a user.
    Unban(UserId),
    UnbanConfirm(UserId),
    UnbanCancel(UserId),
    /// Show statistics for a period.
    Stats(StatsPeriod),
    /// Return to the period menu.
    StatsBack,
    ToggleAnon,
    Language(Language),
}

impl ControlAction {
    /// Splits a moderation payload into its parts.
    ///
    /// `None` for the plain `ban`/`unban` request, `Some(decision)` for a
    /// confirm or cancel answer.
    pub fn moderation(self) -> Option<(ModerationAction, UserId, Option<Decision>)> {
        use ControlAction::*;
        match self {
            Ban(u) => Some((ModerationAction::Block, u, None)),
            BanConfirm(u) => Some((ModerationAction::Block, u, Some(Decision::Confirm))),
            BanCancel(u) => Some((ModerationAction::Block, u, Some(Decision::Cancel))),
            Unban(u) => Some((ModerationAction::Unblock, u, None)),
            UnbanConfirm(u) => Some((ModerationAction::Unblock, u, Some(Decision::Confirm))),
            UnbanCancel(u) => Some((ModerationAction::Unblock, u, Some(Decision::Cancel))),
            _ => None,
        }
    }

    /// Whether the action belongs to the administrator channel.
    pub fn is_admin_action(self) -> bool {
        !matches!(self, ControlAction::ToggleAnon | ControlAction::Language(_))
    }
}

fn parse_user(kind: &str, raw: &str) -> Result<UserId, RelayError> {
    raw.parse::<i64>()
        .map(UserId)
        .map_err(|_| RelayError::InvalidControl(format!("{kind}:{raw}")))
}

impl FromStr for ControlAction {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "toggle_anon" {
            return Ok(ControlAction::ToggleAnon);
        }

        let (kind, arg) = s
            .split_once(':')
            .ok_or_else(|| RelayError::InvalidControl(s.to_string()))?;

        match kind {
            "ban" => parse_user(kind, arg).map(ControlAction::Ban),
            "banconfirm" => parse_user(kind, arg).map(ControlAction::BanConfirm),
            "bancancel" => parse_user(kind, arg).map(ControlAction::BanCancel),
            "unban" => parse_user(kind, arg).map(ControlAction::Unban),
            "unbanconfirm" => parse_user(kind, arg).map(ControlAction::UnbanConfirm),
            "unbancancel" => parse_user(kind, arg).map(ControlAction::UnbanCancel),
            "stats" if arg == "back" => Ok(ControlAction::StatsBack),
            "stats" => arg.parse().map(ControlAction::Stats),
            "lang" => arg
                .parse()
                .map(ControlAction::Language)
                .map_err(|_| RelayError::InvalidControl(s.to_string())),
            _ => Err(RelayError::InvalidControl(s.to_string())),
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlAction::Ban(u) => write!(f, "ban:{u}"),
            ControlAction::BanConfirm(u) => write!(f, "banconfirm:{u}"),
            ControlAction::BanCancel(u) => write!(f, "bancancel:{u}"),
            ControlAction::Unban(u) => write!(f, "unban:{u}"),
            ControlAction::UnbanConfirm(u) => write!(f, "unbanconfirm:{u}"),
            ControlAction::UnbanCancel(u) => write!(f, "unbancancel:{u}"),
            ControlAction::Stats(p) => write!(f, "stats:{p}"),
            ControlAction::StatsBack => f.write_str("stats:back"),
            ControlAction::ToggleAnon => f.write_str("toggle_anon"),
            ControlAction::Language(l) => write!(f, "lang:{l}"),
        }
    }
}
