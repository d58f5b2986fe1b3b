// Reporting window and per-resource outcome.

use chrono::{DateTime, Utc};

/// Trailing one-calendar-month window over which uptime is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Availability of one resource over a reporting period. `None` means no
/// percentage is defined for the period (degenerate window), as opposed to a
/// measured 0%.
#[derive(Debug, Clone, PartialEq)]
pub struct UptimeResult {
    pub label: String,
    pub percentage: Option<f64>,
}
