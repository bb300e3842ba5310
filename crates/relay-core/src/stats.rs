//! Append-only log of inbound messages and the aggregates shown to administrators.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::event::ContentKind;
use crate::ids::UserId;

/// One logical inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEvent {
    pub user: UserId,
    pub at: DateTime<Utc>,
    pub kind: ContentKind,
    pub anonymous: bool,
}

/// Reporting period selectable from the statistics menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Day,
    Week,
    Month,
    All,
}

impl StatsPeriod {
    /// Every period, in menu order.
    pub const ALL: [StatsPeriod; 4] = [
        StatsPeriod::Day,
        StatsPeriod::Week,
        StatsPeriod::Month,
        StatsPeriod::All,
    ];

    /// Fixed length of the window, `None` for all time.
    pub fn window(self) -> Option<Duration> {
        match self {
            StatsPeriod::Day => Some(Duration::days(1)),
            StatsPeriod::Week => Some(Duration::days(7)),
            StatsPeriod::Month => Some(Duration::days(30)),
            StatsPeriod::All => None,
        }
    }

    /// Earliest included timestamp for a query made at `now`.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }

    /// Payload code of the period.
    pub fn code(self) -> &'static str {
        match self {
            StatsPeriod::Day => "day",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::All => "all",
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StatsPeriod {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(StatsPeriod::Day),
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            "all" => Ok(StatsPeriod::All),
            other => Err(RelayError::InvalidControl(format!("unknown period: {other}"))),
        }
    }
}

/// Aggregates over a set of statistics events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub total: usize,
    pub unique_users: usize,
    pub texts: usize,
    pub photos: usize,
    pub videos: usize,
    pub anonymous_senders: usize,
}

impl StatsSummary {
    /// Computes aggregates over `events`.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a StatsEvent>) -> Self {
        let mut summary = StatsSummary::default();
        let mut users = HashSet::new();
        let mut anonymous = HashSet::new();

        for event in events {
            summary.total += 1;
            users.insert(event.user);
            if event.anonymous {
                anonymous.insert(event.user);
            }
            match event.kind {
                ContentKind::Text => summary.texts += 1,
                ContentKind::Photo => summary.photos += 1,
                ContentKind::Video => summary.videos += 1,
            }
        }

        summary.unique_users = users.len();
        summary.anonymous_senders = anonymous.len();
        summary
    }
}

/// Append-only statistics log.
#[derive(Debug, Default)]
pub struct StatsLog {
    events: Vec<StatsEvent>,
}

impl StatsLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn append(&mut self, event: StatsEvent) {
        self.events.push(event);
    }

    /// Events at or after `since`; `None` returns every event.
    pub fn query(&self, since: Option<DateTime<Utc>>) -> Vec<&StatsEvent> {
        self.events
            .iter()
            .filter(|e| since.map_or(true, |cutoff| e.at >= cutoff))
            .collect()
    }

    /// Aggregates for a period ending at `now`.
    pub fn summarize(&self, period: StatsPeriod, now: DateTime<Utc>) -> StatsSummary {
        StatsSummary::from_events(self.query(period.cutoff(now)))
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn event(user: i64, age: Duration, kind: ContentKind, anonymous: bool) -> StatsEvent {
        StatsEvent {
            user: UserId(user),
            at: now() - age,
            kind,
            anonymous,
        }
    }

    #[test]
    fn test_day_window_boundary() {
        let mut log = StatsLog::new();
        log.append(event(1, Duration::seconds(86_400), ContentKind::Text, false));
        log.append(event(2, Duration::seconds(86_401), ContentKind::Text, false));

        let day = log.summarize(StatsPeriod::Day, now());
        assert_eq!(day.total, 1);

        let all = log.summarize(StatsPeriod::All, now());
        assert_eq!(all.total, 2);
    }

    #[test]
    fn test_windows_nest() {
        let mut log = StatsLog::new();
        log.append(event(1, Duration::hours(1), ContentKind::Text, false));
        log.append(event(1, Duration::days(3), ContentKind::Photo, false));
        log.append(event(2, Duration::days(20), ContentKind::Video, true));
        log.append(event(3, Duration::days(400), ContentKind::Text, false));

        assert_eq!(log.summarize(StatsPeriod::Day, now()).total, 1);
        assert_eq!(log.summarize(StatsPeriod::Week, now()).total, 2);
        assert_eq!(log.summarize(StatsPeriod::Month, now()).total, 3);
        assert_eq!(log.summarize(StatsPeriod::All, now()).total, 4);
    }

    #[test]
    fn test_summary_aggregates() {
        let events = vec![
            event(1, Duration::zero(), ContentKind::Text, false),
            event(1, Duration::zero(), ContentKind::Text, true),
            event(2, Duration::zero(), ContentKind::Photo, true),
            event(3, Duration::zero(), ContentKind::Video, false),
        ];
        let summary = StatsSummary::from_events(&events);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.unique_users, 3);
        assert_eq!(summary.texts, 2);
        assert_eq!(summary.photos, 1);
        assert_eq!(summary.videos, 1);
        assert_eq!(summary.anonymous_senders, 2);
    }

    #[test]
    fn test_query_without_cutoff_returns_everything() {
        let mut log = StatsLog::new();
        log.append(event(1, Duration::days(1000), ContentKind::Text, false));
        assert_eq!(log.query(None).len(), 1);
        assert!(log.query(Some(now())).is_empty());
    }

    #[test]
    fn test_period_codes() {
        for period in StatsPeriod::ALL {
            assert_eq!(period.code().parse::<StatsPeriod>().unwrap(), period);
        }
        assert!("year".parse::<StatsPeriod>().is_err());
    }
}
