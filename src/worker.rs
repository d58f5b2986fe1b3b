// Background probe worker. Probes run on a fixed sample tick; stats logging
// and pruning use real-time intervals, independent of check_interval_secs.

use crate::probes::Probe;
use crate::sample_repo::SampleRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{Duration, interval};

/// Probes, store, counters, and shutdown for the worker.
pub struct WorkerDeps {
    pub probes: Vec<Probe>,
    pub sample_repo: Arc<SampleRepo>,
    pub samples_recorded_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub check_interval_secs: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
    /// How often to prune samples past retention (real seconds).
    pub prune_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        probes,
        sample_repo,
        samples_recorded_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        check_interval_secs,
        stats_log_interval_secs,
        prune_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(check_interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut prune_tick = interval(Duration::from_secs(prune_interval_secs));
        prune_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut prune_passes_total: u64 = 0;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", check_interval_secs);
        let _guard = worker_span.enter();

        for probe in &probes {
            tracing::info!(probe = %probe.target(), "probe registered");
        }

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let timestamp_ms = chrono::Utc::now().timestamp_millis();

                    let mut points = Vec::new();
                    for probe in &probes {
                        points.extend(probe.run().await);
                    }
                    if points.is_empty() {
                        continue;
                    }

                    let n = points.len();
                    match sample_repo.record_points(&points, timestamp_ms).await {
                        Ok(()) => {
                            samples_recorded_total.fetch_add(n as u64, Ordering::Relaxed);
                            tracing::debug!(
                                operation = "record_points",
                                samples_count = n,
                                "samples recorded"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "record_points",
                                "sample save failed"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        samples_recorded_total =
                            samples_recorded_total.load(Ordering::Relaxed),
                        prune_passes_total = prune_passes_total,
                        "app stats"
                    );
                }
                _ = prune_tick.tick() => {
                    match sample_repo.prune_old_data().await {
                        Ok(rows) => {
                            tracing::debug!(operation = "prune_old_data", rows, "Old samples pruned");
                            prune_passes_total += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "prune_old_data",
                                "Failed to prune old samples"
                            );
                        }
                    }
                }
            }
        }
    })
}
