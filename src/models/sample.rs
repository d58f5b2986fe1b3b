// Probe readings and the bucketed form the store hands back.

use chrono::{DateTime, Utc};

/// One reading emitted by a probe. The store stamps the record time when the
/// point is written, so a whole tick's points share one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub resource: String,
    pub metric: String,
    pub value: f64,
}

/// All samples of one (resource, metric) pair within one fixed-width
/// sub-interval, pre-summed by the store's range query. Intervals with no
/// samples have no bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBucket {
    pub bucket_start: DateTime<Utc>,
    pub sum: f64,
}
