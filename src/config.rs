use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub http_probes: Vec<HttpProbeConfig>,
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

// Monthly reports need at least two full calendar months of samples on disk.
fn default_retention_days() -> u32 {
    92
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Seconds between probe runs. Doubles as the expected check frequency in
    /// the uptime calculation, so sampler and report stay in agreement.
    pub check_interval_secs: u64,
    /// How often to log app stats (samples recorded, prune passes) at INFO level.
    pub stats_log_interval_secs: u64,
    /// How often to prune samples past the retention window (real seconds).
    pub prune_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KubernetesConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "default".into()
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Head,
    Post,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpProbeConfig {
    /// Resource id the samples are recorded under.
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    /// When set, only this response status counts as up. When unset, any
    /// response counts (reachability check).
    pub expect_status: Option<u16>,
    /// Optional JSON request body (POST probes).
    pub body: Option<String>,
    /// Basic-auth user; the password comes from the environment variable
    /// named in `password_env`.
    pub username: Option<String>,
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Cron expression with a seconds field, e.g. "0 0 9 1 * *" = 09:00 UTC
    /// on the first of every month.
    pub schedule: String,
    pub subject: String,
    /// Report destination. When unset, reports go to the log.
    pub webhook_url: Option<String>,
    #[serde(default = "default_bucket_seconds")]
    pub bucket_seconds: u32,
    /// Report lines, in order.
    pub resources: Vec<ReportResourceConfig>,
}

fn default_bucket_seconds() -> u32 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportResourceConfig {
    /// Line label in the rendered report, e.g. "CREDENTIALS-DB STATEFULSET".
    pub label: String,
    /// Resource id the probes record under.
    pub resource: String,
    /// Health metric name, e.g. "statefulset_health_check".
    pub metric: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            self.monitoring.check_interval_secs > 0,
            "monitoring.check_interval_secs must be > 0, got {}",
            self.monitoring.check_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.prune_interval_secs > 0,
            "monitoring.prune_interval_secs must be > 0, got {}",
            self.monitoring.prune_interval_secs
        );
        if self.kubernetes.enabled {
            anyhow::ensure!(
                !self.kubernetes.namespace.is_empty(),
                "kubernetes.namespace must be non-empty when kubernetes.enabled"
            );
        }
        for probe in &self.http_probes {
            anyhow::ensure!(
                !probe.name.is_empty(),
                "http_probes entries must have a non-empty name"
            );
            anyhow::ensure!(
                !probe.url.is_empty(),
                "http_probes.{}: url must be non-empty",
                probe.name
            );
            if let Some(body) = &probe.body {
                serde_json::from_str::<serde_json::Value>(body).map_err(|e| {
                    anyhow::anyhow!("http_probes.{}: body is not valid JSON: {}", probe.name, e)
                })?;
            }
            anyhow::ensure!(
                probe.password_env.is_none() || probe.username.is_some(),
                "http_probes.{}: password_env requires username",
                probe.name
            );
        }
        cron::Schedule::from_str(&self.reporting.schedule).map_err(|e| {
            anyhow::anyhow!("reporting.schedule is not a valid cron expression: {}", e)
        })?;
        anyhow::ensure!(
            !self.reporting.subject.is_empty(),
            "reporting.subject must be non-empty"
        );
        anyhow::ensure!(
            self.reporting.bucket_seconds > 0,
            "reporting.bucket_seconds must be > 0, got {}",
            self.reporting.bucket_seconds
        );
        anyhow::ensure!(
            !self.reporting.resources.is_empty(),
            "reporting.resources must list at least one resource"
        );
        for resource in &self.reporting.resources {
            anyhow::ensure!(
                !resource.label.is_empty()
                    && !resource.resource.is_empty()
                    && !resource.metric.is_empty(),
                "reporting.resources entries must have non-empty label, resource, and metric"
            );
        }
        Ok(())
    }
}
