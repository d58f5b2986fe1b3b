// Probes: one strategy per resource kind. Each run yields the points to
// record for the current tick; a failing probe reads as down (or records
// nothing, for workload listing failures), never as a worker crash.

mod http;
mod workload;

pub use http::{HttpProbe, status_health};
pub use workload::{WorkloadProbe, replica_health};

use crate::models::MetricPoint;

/// Binary health metric names, one per resource kind. The reporting config
/// references these when selecting which samples feed each report line.
pub const DEPLOYMENT_HEALTH_CHECK: &str = "deployment_health_check";
pub const STATEFULSET_HEALTH_CHECK: &str = "statefulset_health_check";
pub const HTTP_HEALTH_CHECK: &str = "http_health_check";

/// One monitored resource kind, with its client injected at construction.
pub enum Probe {
    Workload(WorkloadProbe),
    Http(HttpProbe),
}

impl Probe {
    /// Target description for logging.
    pub fn target(&self) -> String {
        match self {
            Probe::Workload(p) => format!("kubernetes namespace {}", p.namespace()),
            Probe::Http(p) => format!("http endpoint {}", p.name()),
        }
    }

    pub async fn run(&self) -> Vec<MetricPoint> {
        match self {
            Probe::Workload(p) => p.run().await,
            Probe::Http(p) => p.run().await,
        }
    }
}
