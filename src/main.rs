use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use uptimed::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let sample_repo = Arc::new(
        sample_repo::SampleRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
            app_config.database.retention_days,
        )
        .await?,
    );
    sample_repo.init().await?;

    let mut probes: Vec<probes::Probe> = Vec::new();
    if app_config.kubernetes.enabled {
        let client = kube::Client::try_default().await?;
        probes.push(probes::Probe::Workload(probes::WorkloadProbe::new(
            client,
            app_config.kubernetes.namespace.clone(),
        )));
    }
    let http_client = reqwest::Client::new();
    for probe_config in &app_config.http_probes {
        probes.push(probes::Probe::Http(probes::HttpProbe::new(
            http_client.clone(),
            probe_config.clone(),
        )?));
    }
    anyhow::ensure!(
        !probes.is_empty(),
        "no probes configured; enable [kubernetes] or add [[http_probes]]"
    );

    let notifier = Arc::new(notify::Notifier::from_config(
        app_config.reporting.webhook_url.clone(),
    ));

    let samples_recorded_total = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            probes,
            sample_repo: sample_repo.clone(),
            samples_recorded_total,
            shutdown_rx,
        },
        worker::WorkerConfig {
            check_interval_secs: app_config.monitoring.check_interval_secs,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
            prune_interval_secs: app_config.monitoring.prune_interval_secs,
        },
    );

    let report_handle = report_worker::spawn(
        sample_repo,
        notifier,
        report_worker::ReportWorkerConfig {
            reporting: app_config.reporting.clone(),
            frequency_secs: app_config.monitoring.check_interval_secs as f64,
        },
    );

    tracing::info!(
        version = version::VERSION,
        schedule = %app_config.reporting.schedule,
        "uptimed started"
    );

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    report_handle.abort();

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
