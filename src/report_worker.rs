// Background worker: once per schedule tick, compute each configured
// resource's trailing-month uptime and publish the rendered report.
// The schedule is a cron expression evaluated in UTC.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::config::ReportingConfig;
use crate::models::UptimeResult;
use crate::notify::Notifier;
use crate::sample_repo::SampleRepo;
use crate::uptime::{self, UptimeError};

/// Config for the report worker.
#[derive(Debug, Clone)]
pub struct ReportWorkerConfig {
    pub reporting: ReportingConfig,
    /// Expected seconds between checks; the probe worker's sample interval.
    pub frequency_secs: f64,
}

/// Spawns the report worker. Returns a join handle.
pub fn spawn(
    repo: Arc<SampleRepo>,
    notifier: Arc<Notifier>,
    config: ReportWorkerConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(repo, notifier, config).await;
    })
}

#[instrument(skip(repo, notifier, config), fields(schedule = %config.reporting.schedule))]
async fn run(repo: Arc<SampleRepo>, notifier: Arc<Notifier>, config: ReportWorkerConfig) {
    let (report_tx, mut report_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(report_scheduler(config.reporting.schedule.clone(), report_tx));

    while report_rx.recv().await.is_some() {
        let end = Utc::now();
        match run_one_report(&repo, &config, end).await {
            Ok(message) => {
                notifier.publish(&config.reporting.subject, &message).await;
                // Prune has run in the background all month; compact once the
                // report is out.
                if let Err(e) = repo.vacuum().await {
                    warn!(error = %e, "vacuum failed");
                } else {
                    info!("vacuum complete");
                }
            }
            Err(e) => warn!(error = %e, "report pass failed"),
        }
    }
}

/// Sends a message on `tx` at each schedule fire time. Uses UTC, matching the
/// reporting-period arithmetic.
async fn report_scheduler(schedule: String, tx: tokio::sync::mpsc::Sender<()>) {
    let Ok(schedule) = cron::Schedule::from_str(&schedule) else {
        warn!(cron = %schedule, "invalid reporting schedule; reports will not run");
        return;
    };
    loop {
        let now = Utc::now();
        let Some(next) = schedule.after(&now).next() else {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            continue;
        };
        let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
        tokio::time::sleep(delay).await;
        if tx.send(()).await.is_err() {
            break;
        }
    }
}

/// Runs one report pass over the calendar month ending at `end` and returns
/// the rendered message. Used by the worker loop and by tests.
///
/// A failed fetch degrades that one resource to an empty window (which the
/// uptime math reads as fully down); a degenerate period yields an
/// `undefined` line. Neither aborts the rest of the report.
pub async fn run_one_report(
    repo: &SampleRepo,
    config: &ReportWorkerConfig,
    end: DateTime<Utc>,
) -> anyhow::Result<String> {
    let period = uptime::reporting_period(end)?;
    let mut results = Vec::with_capacity(config.reporting.resources.len());

    for resource in &config.reporting.resources {
        let window = match repo
            .fetch_sum_samples(
                &resource.resource,
                &resource.metric,
                period.start,
                period.end,
                config.reporting.bucket_seconds,
            )
            .await
        {
            Ok(window) => window,
            Err(e) => {
                warn!(
                    error = %e,
                    resource = %resource.resource,
                    metric = %resource.metric,
                    "sample fetch failed; treating as empty window"
                );
                Vec::new()
            }
        };

        let percentage = match uptime::compute_uptime(&window, &period, config.frequency_secs) {
            Ok(pct) => Some(pct),
            Err(e @ UptimeError::DegeneratePeriod { .. }) => {
                warn!(error = %e, resource = %resource.resource, "uptime undefined");
                None
            }
            Err(e) => return Err(e.into()),
        };
        results.push(UptimeResult {
            label: resource.label.clone(),
            percentage,
        });
    }

    Ok(uptime::render_report(&period, &results))
}
