use chrono::{DateTime, Utc};

/// Compact "how long ago" caption for lists and badges
pub fn format_time_ago(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = then else {
        return "unknown".to_string();
    };

    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days == 1 {
        "yesterday".to_string()
    } else {
        format!("{days} days ago")
    }
}

/// Full local-style rendering of a record timestamp
pub fn format_timestamp(then: Option<DateTime<Utc>>) -> String {
    match then {
        Some(then) => then.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn buckets_round_sensibly() {
        let now = Utc::now();
        let ago = |d: Duration| format_time_ago(Some(now - d), now);

        assert_eq!(ago(Duration::seconds(20)), "just now");
        assert_eq!(ago(Duration::minutes(5)), "5 min ago");
        assert_eq!(ago(Duration::hours(3)), "3h ago");
        assert_eq!(ago(Duration::hours(30)), "yesterday");
        assert_eq!(ago(Duration::days(4)), "4 days ago");
    }

    #[test]
    fn missing_timestamps_render_as_unknown() {
        assert_eq!(format_time_ago(None, Utc::now()), "unknown");
        assert_eq!(format_timestamp(None), "unknown");
    }
}
