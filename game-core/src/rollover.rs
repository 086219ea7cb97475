use chrono::{DateTime, FixedOffset};
use std::time::Duration;

/// How often a running client re-checks for a new calendar day
pub const DEFAULT_STALENESS_CHECK: Duration = Duration::from_secs(30);

/// Whether a stored record still belongs to the current day
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAge {
    /// Nothing stored to compare
    Empty,
    Today,
    Stale { reason: String },
}

impl RecordAge {
    pub fn is_stale(&self) -> bool {
        matches!(self, RecordAge::Stale { .. })
    }
}

/// Compare the stored reference timestamp with `now`, both as local calendar
/// dates in `now`'s offset. An unreadable timestamp is stale.
pub fn record_age(reference: Option<&str>, now: DateTime<FixedOffset>) -> RecordAge {
    let Some(reference) = reference else {
        return RecordAge::Empty;
    };

    match DateTime::parse_from_rfc3339(reference) {
        Ok(stored) => {
            let stored_day = stored.with_timezone(now.offset()).date_naive();
            let today = now.date_naive();
            if stored_day == today {
                RecordAge::Today
            } else {
                RecordAge::Stale {
                    reason: format!("record is from {}, today is {}", stored_day, today),
                }
            }
        }
        Err(e) => RecordAge::Stale {
            reason: format!("unreadable record date '{}': {}", reference, e),
        },
    }
}
