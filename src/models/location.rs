use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// A single reported device position with optional contextual metadata
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i64,
    pub machine_name: String,
    pub user_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub location_source: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub public_ip: Option<String>,
    pub created_at: Option<String>,
    pub timestamp: Option<String>,
}

impl Location {
    /// When the position was recorded. `created_at` wins over `timestamp`.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .or(self.timestamp.as_deref())
            .and_then(parse_timestamp)
    }

    /// Age bucket relative to `now`; unknown timestamps count as stale.
    pub fn age_tier(&self, now: DateTime<Utc>) -> AgeTier {
        self.recorded_at()
            .map(|t| AgeTier::classify(t, now))
            .unwrap_or(AgeTier::Stale)
    }
}

/// Recency bucket for a reported position, with fixed 1/6/24 hour thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeTier {
    Fresh,
    Recent,
    Old,
    Stale,
}

impl AgeTier {
    pub fn classify(recorded: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age = now.signed_duration_since(recorded);
        if age < Duration::hours(1) {
            AgeTier::Fresh
        } else if age < Duration::hours(6) {
            AgeTier::Recent
        } else if age < Duration::hours(24) {
            AgeTier::Old
        } else {
            AgeTier::Stale
        }
    }

    /// Marker color for this bucket
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            AgeTier::Fresh => (76, 175, 80),    // green
            AgeTier::Recent => (255, 152, 0),   // orange
            AgeTier::Old => (244, 67, 54),      // red
            AgeTier::Stale => (158, 158, 158),  // grey
        }
    }
}

/// Parse a backend timestamp. The server emits RFC 3339, but older records
/// carry naive datetimes which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
