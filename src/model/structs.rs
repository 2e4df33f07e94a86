use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

/// Opaque backend identifier, serialized exactly as given.
///
/// Text is only read as a number when it is the canonical form of that
/// number, so "0012" or "+5" stay strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl FromStr for EntityId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => EntityId::Number(n),
            _ => EntityId::Text(s.to_string()),
        })
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Number(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Text(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Upcoming,
    Active,
    Past,
    #[serde(untagged)]
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Active => "active",
            SessionStatus::Past => "past",
            SessionStatus::Other(s) => s,
        }
    }
}

impl FromStr for SessionStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => SessionStatus::Upcoming,
            "active" => SessionStatus::Active,
            "past" => SessionStatus::Past,
            _ => SessionStatus::Other(s.to_string()),
        })
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling fields of a session, enough to work out where it sits in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSchedule {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
    pub status: SessionStatus,
}

impl SessionSchedule {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// `None` when the duration does not fit the calendar.
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        TimeDelta::try_minutes(self.duration_minutes)
            .and_then(|length| self.starts_at().checked_add_signed(length))
    }

    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        self.ends_at()
            .is_some_and(|end| self.starts_at() <= now && now <= end)
    }

    /// Status the session should have at `now`.
    ///
    /// Only moves forward: upcoming -> active -> past. Statuses set by hand
    /// (including an active session that has not ended yet) are left alone,
    /// as is any session whose end cannot be computed.
    pub fn effective_status(&self, now: NaiveDateTime) -> SessionStatus {
        let Some(end) = self.ends_at() else {
            return self.status.clone();
        };
        match self.status {
            SessionStatus::Active if now > end => SessionStatus::Past,
            SessionStatus::Upcoming if self.starts_at() <= now => {
                if now <= end {
                    SessionStatus::Active
                } else {
                    SessionStatus::Past
                }
            }
            ref status => status.clone(),
        }
    }
}

/// Device coordinates in degrees, as reported by the platform geolocation service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters, when the platform reports one.
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }
}

/// Why a position request failed. Codes follow the browser geolocation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(String),
}

impl PositionError {
    pub fn from_code(code: u16, message: &str) -> Self {
        match code {
            1 => PositionError::PermissionDenied,
            2 => PositionError::PositionUnavailable,
            3 => PositionError::Timeout,
            _ => PositionError::Other(message.to_string()),
        }
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::PermissionDenied => f.write_str("permission denied"),
            PositionError::PositionUnavailable => f.write_str("position unavailable"),
            PositionError::Timeout => f.write_str("timed out"),
            PositionError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Body returned by every `/api/*` endpoint. A missing `success` counts as a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEntry {
    pub course_name: String,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sessions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended_sessions: Option<u32>,
}

impl AnalyticsEntry {
    pub fn new(course_name: impl Into<String>, percentage: f64) -> Self {
        Self {
            course_name: course_name.into(),
            percentage,
            total_sessions: None,
            attended_sessions: None,
        }
    }

    /// Percentage of past sessions attended, rounded to one decimal. Zero sessions gives 0.
    pub fn from_counts(course_name: impl Into<String>, attended: u32, total: u32) -> Self {
        let percentage = if total > 0 {
            (f64::from(attended) / f64::from(total) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Self {
            course_name: course_name.into(),
            percentage,
            total_sessions: Some(total),
            attended_sessions: Some(attended),
        }
    }
}
