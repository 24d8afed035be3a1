use chrono::{DateTime, Utc};

use super::location::parse_timestamp;

/// A tracked device, aggregating many locations. The backend is inconsistent
/// about field names between endpoints, hence the aliases.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Machine {
    #[serde(alias = "name")]
    pub machine_name: String,
    #[serde(alias = "locations_count", default)]
    pub count: u64,
    pub last_seen: Option<String>,
}

impl Machine {
    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        self.last_seen.as_deref().and_then(parse_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_field_spellings() {
        let a: Machine = serde_json::from_str(
            r#"{"machine_name": "LAPTOP-1", "count": 12, "last_seen": "2024-03-04T10:30:00Z"}"#,
        )
        .unwrap();
        let b: Machine = serde_json::from_str(
            r#"{"name": "LAPTOP-1", "locations_count": 12, "last_seen": "2024-03-04T10:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(a, b);
        assert!(a.last_seen_at().is_some());
    }
}
