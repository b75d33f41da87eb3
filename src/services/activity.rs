// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recent punch log for the admin dashboard.
//!
//! Kept per staff user in memory only; a restart clears it.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Entries kept per staff member.
pub const RECENT_PUNCH_LIMIT: usize = 10;

/// One punch submitted from the admin scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct PunchRecord {
    pub card_id: String,
    pub customer_id: Option<String>,
    pub remaining: Option<u32>,
    pub punched_at: DateTime<Utc>,
}

/// Shared, bounded, most-recent-first punch history keyed by staff user id.
#[derive(Clone, Default)]
pub struct RecentPunches {
    entries: Arc<DashMap<String, VecDeque<PunchRecord>>>,
}

impl RecentPunches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a punch, evicting the oldest past the limit.
    pub fn record(&self, staff_id: &str, record: PunchRecord) {
        let mut log = self.entries.entry(staff_id.to_string()).or_default();
        log.push_front(record);
        log.truncate(RECENT_PUNCH_LIMIT);
    }

    /// Most recent first.
    pub fn list(&self, staff_id: &str) -> Vec<PunchRecord> {
        self.entries
            .get(staff_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Human-friendly age of `then` relative to `now`.
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(then).num_minutes();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minutes ago")
    } else if minutes < 1440 {
        format!("{} hours ago", minutes / 60)
    } else {
        format!("{} days ago", minutes / 1440)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(card_id: &str) -> PunchRecord {
        PunchRecord {
            card_id: card_id.to_string(),
            customer_id: None,
            remaining: Some(2),
            punched_at: Utc::now(),
        }
    }

    #[test]
    fn test_log_is_bounded_and_newest_first() {
        let log = RecentPunches::new();
        for i in 0..15 {
            log.record("staff-1", record(&format!("card-{i}")));
        }

        let entries = log.list("staff-1");
        assert_eq!(entries.len(), RECENT_PUNCH_LIMIT);
        assert_eq!(entries[0].card_id, "card-14");
        assert_eq!(entries[9].card_id, "card-5");
        assert!(log.list("staff-2").is_empty());
    }

    #[test]
    fn test_format_time_ago() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_time_ago(now - Duration::minutes(125), now), "2 hours ago");
        assert_eq!(format_time_ago(now - Duration::days(3), now), "3 days ago");
    }
}
