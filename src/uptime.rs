// Uptime math: reporting-period rollback, availability percentage, report
// rendering. Store access (bucketed sums) stays in sample_repo; nothing here
// does I/O or reads the clock.

use std::fmt::Write as _;

use chrono::{DateTime, Months, Utc};
use thiserror::Error;

use crate::models::{ReportingPeriod, SampleBucket, UptimeResult};

/// Timestamp format used for the period boundaries in the rendered report.
const PERIOD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const REPORT_PREAMBLE: &str = "The uptime report is calculated as follows:\n\n\
Resource statuses are sampled once per check interval. For Kubernetes, a \
health sample with value 1 is recorded for each deployment with at least one \
available pod and for each stateful set with at least one current pod, \
otherwise with a value of 0. HTTP endpoints record 1 for a successful \
response and 0 otherwise.\n\n\
Once a month, the uptime for each resource is calculated as a percentage of \
the number of successful health checks to the total number of expected \
health checks.\n\n";

/// Failure modes of the uptime math. Deterministic, no I/O.
#[derive(Debug, Error, PartialEq)]
pub enum UptimeError {
    /// The period and frequency admit no checks at all, so a percentage is
    /// undefined. Returned instead of letting the division produce NaN or an
    /// infinity.
    #[error("no checks possible between {start} and {end} at one per {frequency_secs}s")]
    DegeneratePeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        frequency_secs: f64,
    },
    /// One month before `end` falls outside the representable date range.
    #[error("cannot roll {end} back one calendar month")]
    PeriodOutOfRange { end: DateTime<Utc> },
}

/// Rolls `end` back exactly one calendar month. The day of month and time of
/// day are preserved; when the day does not exist in the target month it
/// clamps to that month's last valid day (2021-03-31 -> 2021-02-28). January
/// rolls back to December of the previous year.
pub fn reporting_period(end: DateTime<Utc>) -> Result<ReportingPeriod, UptimeError> {
    let start = end
        .checked_sub_months(Months::new(1))
        .ok_or(UptimeError::PeriodOutOfRange { end })?;
    Ok(ReportingPeriod { start, end })
}

/// Percentage of expected checks that reported up across the period.
///
/// The expected count assumes one check every `frequency_secs` over the whole
/// period, regardless of how many buckets actually hold data. Two
/// consequences, both kept for parity with the recorded metrics:
/// - a window with no buckets computes to 0.0, so a month with no samples
///   reads as a fully down month rather than an unmeasured one;
/// - the result is not clamped to 100; checks that ran more often than
///   `frequency_secs` predicts push it above, which is worth seeing as-is.
///
/// Bucket order does not matter; the sums are added irrespective of it.
pub fn compute_uptime(
    window: &[SampleBucket],
    period: &ReportingPeriod,
    frequency_secs: f64,
) -> Result<f64, UptimeError> {
    let period_secs = (period.end - period.start).num_milliseconds() as f64 / 1000.0;
    let total_possible = period_secs / frequency_secs;
    if total_possible <= 0.0 || !total_possible.is_finite() {
        return Err(UptimeError::DegeneratePeriod {
            start: period.start,
            end: period.end,
            frequency_secs,
        });
    }

    let total_up: f64 = window.iter().map(|b| b.sum).sum();
    Ok(100.0 * total_up / total_possible)
}

/// Renders the consolidated report: fixed preamble, period boundaries, one
/// line per result in caller order. An undefined percentage renders as the
/// literal `undefined`, never as NaN or an infinity. Output is byte-identical
/// for identical input.
pub fn render_report(period: &ReportingPeriod, results: &[UptimeResult]) -> String {
    let mut out = String::from(REPORT_PREAMBLE);
    let _ = write!(
        out,
        "*****UPTIME FOR {} --- {}*****\n\n",
        period.start.format(PERIOD_TIME_FORMAT),
        period.end.format(PERIOD_TIME_FORMAT)
    );
    for result in results {
        match result.percentage {
            Some(pct) => {
                let _ = writeln!(out, "\t{}: {:.2}%", result.label, pct);
            }
            None => {
                let _ = writeln!(out, "\t{}: undefined", result.label);
            }
        }
    }
    out
}
