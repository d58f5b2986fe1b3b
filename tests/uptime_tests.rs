// Uptime math tests: period rollback (incl. day clamping), percentage edge
// cases, report rendering determinism.

use chrono::{TimeZone, Utc};
use uptimed::models::{ReportingPeriod, SampleBucket, UptimeResult};
use uptimed::uptime::{UptimeError, compute_uptime, render_report, reporting_period};

fn bucket(ts_ms: i64, sum: f64) -> SampleBucket {
    SampleBucket {
        bucket_start: Utc.timestamp_millis_opt(ts_ms).unwrap(),
        sum,
    }
}

#[test]
fn reporting_period_rolls_back_one_month() {
    let end = Utc.with_ymd_and_hms(2021, 1, 15, 12, 30, 45).unwrap();
    let period = reporting_period(end).unwrap();
    assert_eq!(
        period.start,
        Utc.with_ymd_and_hms(2020, 12, 15, 12, 30, 45).unwrap()
    );
    assert_eq!(period.end, end);
}

#[test]
fn reporting_period_clamps_day_to_shorter_month() {
    let end = Utc.with_ymd_and_hms(2021, 3, 31, 0, 0, 0).unwrap();
    let period = reporting_period(end).unwrap();
    assert_eq!(period.start, Utc.with_ymd_and_hms(2021, 2, 28, 0, 0, 0).unwrap());
    assert!(period.start < period.end);
}

#[test]
fn reporting_period_clamps_to_leap_day() {
    let end = Utc.with_ymd_and_hms(2024, 3, 31, 6, 0, 0).unwrap();
    let period = reporting_period(end).unwrap();
    assert_eq!(period.start, Utc.with_ymd_and_hms(2024, 2, 29, 6, 0, 0).unwrap());
}

#[test]
fn compute_uptime_empty_window_is_zero_not_error() {
    // One hour at one check per minute: 60 expected checks, none recorded.
    // No samples reads as fully down, not as "never measured" -- the window
    // and a genuinely dead resource are indistinguishable here.
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 1, 0, 0).unwrap(),
    };
    let pct = compute_uptime(&[], &period, 60.0).unwrap();
    assert_eq!(pct, 0.0);
}

#[test]
fn compute_uptime_full_window_is_hundred() {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 1, 0, 0).unwrap(),
    };
    let window = vec![bucket(0, 25.0), bucket(1_800_000, 35.0)];
    let pct = compute_uptime(&window, &period, 60.0).unwrap();
    assert_eq!(pct, 100.0);
}

#[test]
fn compute_uptime_over_reporting_exceeds_hundred() {
    // Checks ran twice as often as the configured frequency predicts; the
    // excess shows up in the result instead of being clamped away.
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 1, 0, 0).unwrap(),
    };
    let window = vec![bucket(0, 120.0)];
    let pct = compute_uptime(&window, &period, 60.0).unwrap();
    assert_eq!(pct, 200.0);
}

#[test]
fn compute_uptime_ignores_bucket_order() {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 1, 0, 0).unwrap(),
    };
    let ordered = vec![bucket(0, 10.0), bucket(1_800_000, 20.0)];
    let reversed = vec![bucket(1_800_000, 20.0), bucket(0, 10.0)];
    assert_eq!(
        compute_uptime(&ordered, &period, 60.0).unwrap(),
        compute_uptime(&reversed, &period, 60.0).unwrap()
    );
}

#[test]
fn compute_uptime_degenerate_period_is_typed_error() {
    let instant = Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap();
    let period = ReportingPeriod {
        start: instant,
        end: instant,
    };
    let err = compute_uptime(&[bucket(0, 5.0)], &period, 60.0).unwrap_err();
    assert!(matches!(err, UptimeError::DegeneratePeriod { .. }));
}

#[test]
fn compute_uptime_nonpositive_frequency_is_typed_error() {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 1, 0, 0).unwrap(),
    };
    for frequency in [0.0, -60.0, f64::INFINITY, f64::NAN] {
        let err = compute_uptime(&[], &period, frequency).unwrap_err();
        assert!(matches!(err, UptimeError::DegeneratePeriod { .. }));
    }
}

#[test]
fn compute_uptime_is_pure() {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
    };
    let window = vec![bucket(1_619_827_200_000, 42.0), bucket(1_619_830_800_000, 17.5)];
    let first = compute_uptime(&window, &period, 60.0).unwrap();
    let second = compute_uptime(&window, &period, 60.0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn render_report_is_deterministic_and_ordered() {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 4, 1, 9, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 9, 0, 0).unwrap(),
    };
    let results = vec![
        UptimeResult {
            label: "CAS DEPLOYMENT".into(),
            percentage: Some(99.8765),
        },
        UptimeResult {
            label: "NGINX REDIRECT".into(),
            percentage: Some(100.0),
        },
    ];

    let first = render_report(&period, &results);
    let second = render_report(&period, &results);
    assert_eq!(first, second);

    assert!(first.contains("*****UPTIME FOR 2021-04-01 09:00:00 --- 2021-05-01 09:00:00*****"));
    assert!(first.contains("\tCAS DEPLOYMENT: 99.88%"));
    assert!(first.contains("\tNGINX REDIRECT: 100.00%"));
    // Caller order, not sorted
    assert!(first.find("CAS DEPLOYMENT").unwrap() < first.find("NGINX REDIRECT").unwrap());
}

#[test]
fn render_report_marks_undefined_without_nan() {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2021, 4, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap(),
    };
    let results = vec![UptimeResult {
        label: "QUERY ENDPOINT".into(),
        percentage: None,
    }];
    let report = render_report(&period, &results);
    assert!(report.contains("\tQUERY ENDPOINT: undefined"));
    assert!(!report.contains("NaN"));
    assert!(!report.contains("inf"));
}
