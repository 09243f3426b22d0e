//! Expiry classification of lots relative to an "as of" date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lots expiring within this many days are "expiring soon".
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Beyond this many days a lot is simply "good".
pub const EXPIRY_WATCH_DAYS: i64 = 90;

/// Expiry classification of a lot relative to a calendar date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "remaining", rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    /// 0..=30 days left, reported in days.
    ExpiringWithinDays(i64),
    /// 31..=90 days left, reported in whole 30-day months.
    ExpiringWithinMonths(i64),
    Good,
}

/// Coarse status used by reports and CSV export.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Good,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    Expired,
}

impl ReportStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Good => "Good",
            ReportStatus::ExpiringSoon => "Expiring Soon",
            ReportStatus::Expired => "Expired",
        }
    }
}

/// Whole calendar days from `as_of` until `expiration_date` (negative once past).
pub fn days_until_expiry(expiration_date: NaiveDate, as_of: NaiveDate) -> i64 {
    expiration_date.signed_duration_since(as_of).num_days()
}

pub fn expiry_status(expiration_date: NaiveDate, as_of: NaiveDate) -> ExpiryStatus {
    let days = days_until_expiry(expiration_date, as_of);
    if days < 0 {
        ExpiryStatus::Expired
    } else if days <= EXPIRING_SOON_DAYS {
        ExpiryStatus::ExpiringWithinDays(days)
    } else if days <= EXPIRY_WATCH_DAYS {
        ExpiryStatus::ExpiringWithinMonths(days / 30)
    } else {
        ExpiryStatus::Good
    }
}

impl ExpiryStatus {
    /// Badge text shown next to a lot.
    pub fn label(self) -> String {
        match self {
            ExpiryStatus::Expired => "Expired".to_string(),
            ExpiryStatus::ExpiringWithinDays(d) => format!("{d}d left"),
            ExpiryStatus::ExpiringWithinMonths(m) => format!("{m}m left"),
            ExpiryStatus::Good => "Good".to_string(),
        }
    }

    pub fn is_expired(self) -> bool {
        matches!(self, ExpiryStatus::Expired)
    }

    pub fn is_expiring_soon(self) -> bool {
        matches!(self, ExpiryStatus::ExpiringWithinDays(_))
    }

    pub fn report_status(self) -> ReportStatus {
        match self {
            ExpiryStatus::Expired => ReportStatus::Expired,
            ExpiryStatus::ExpiringWithinDays(_) => ReportStatus::ExpiringSoon,
            ExpiryStatus::ExpiringWithinMonths(_) | ExpiryStatus::Good => ReportStatus::Good,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn classifies_relative_to_as_of() {
        let t = today();
        assert_eq!(expiry_status(t + Duration::days(25), t), ExpiryStatus::ExpiringWithinDays(25));
        assert_eq!(expiry_status(t - Duration::days(1), t), ExpiryStatus::Expired);
        assert_eq!(expiry_status(t, t), ExpiryStatus::ExpiringWithinDays(0));
        assert_eq!(expiry_status(t + Duration::days(30), t), ExpiryStatus::ExpiringWithinDays(30));
        assert_eq!(expiry_status(t + Duration::days(31), t), ExpiryStatus::ExpiringWithinMonths(1));
        assert_eq!(expiry_status(t + Duration::days(89), t), ExpiryStatus::ExpiringWithinMonths(2));
        assert_eq!(expiry_status(t + Duration::days(90), t), ExpiryStatus::ExpiringWithinMonths(3));
        assert_eq!(expiry_status(t + Duration::days(91), t), ExpiryStatus::Good);
    }

    #[test]
    fn repeated_calls_agree() {
        let t = today();
        let exp = t + Duration::days(45);
        assert_eq!(expiry_status(exp, t), expiry_status(exp, t));
    }

    #[test]
    fn labels_and_report_status() {
        assert_eq!(ExpiryStatus::ExpiringWithinDays(25).label(), "25d left");
        assert_eq!(ExpiryStatus::ExpiringWithinMonths(2).label(), "2m left");
        assert_eq!(ExpiryStatus::Expired.report_status().label(), "Expired");
        assert_eq!(ExpiryStatus::ExpiringWithinDays(3).report_status(), ReportStatus::ExpiringSoon);
        assert_eq!(ExpiryStatus::ExpiringWithinMonths(2).report_status(), ReportStatus::Good);
    }
}
