// Domain models

mod report;
mod sample;

pub use report::{ReportingPeriod, UptimeResult};
pub use sample::{MetricPoint, SampleBucket};
