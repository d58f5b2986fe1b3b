// Probe health-policy tests (pure mapping functions).

use uptimed::probes::{replica_health, status_health};

#[test]
fn replica_health_is_up_with_any_pod() {
    assert_eq!(replica_health(0), 0.0);
    assert_eq!(replica_health(1), 1.0);
    assert_eq!(replica_health(3), 1.0);
}

#[test]
fn status_health_exact_match_when_expected() {
    assert_eq!(status_health(200, Some(200)), 1.0);
    assert_eq!(status_health(503, Some(200)), 0.0);
    assert_eq!(status_health(301, Some(200)), 0.0);
}

#[test]
fn status_health_any_response_counts_without_expectation() {
    // Reachability probes treat any answer, even an error status, as up;
    // only a transport failure records down.
    assert_eq!(status_health(200, None), 1.0);
    assert_eq!(status_health(301, None), 1.0);
    assert_eq!(status_health(500, None), 1.0);
}
