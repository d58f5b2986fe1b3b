// HTTP endpoint probes: HEAD reachability checks and POST status checks.

use reqwest::Client;
use tracing::{debug, warn};

use super::HTTP_HEALTH_CHECK;
use crate::config::{HttpMethod, HttpProbeConfig};
use crate::models::MetricPoint;

pub struct HttpProbe {
    client: Client,
    config: HttpProbeConfig,
    /// Resolved at construction so a missing password env var fails startup,
    /// not every tick.
    basic_auth: Option<(String, String)>,
}

/// With an expected status the check is exact; without one, any response at
/// all counts as up.
pub fn status_health(status: u16, expect_status: Option<u16>) -> f64 {
    match expect_status {
        Some(expected) if status == expected => 1.0,
        Some(_) => 0.0,
        None => 1.0,
    }
}

impl HttpProbe {
    pub fn new(client: Client, config: HttpProbeConfig) -> anyhow::Result<Self> {
        let basic_auth = match (&config.username, &config.password_env) {
            (Some(username), Some(var)) => {
                let password = std::env::var(var).map_err(|_| {
                    anyhow::anyhow!(
                        "http_probes.{}: environment variable {} is not set",
                        config.name,
                        var
                    )
                })?;
                Some((username.clone(), password))
            }
            (Some(username), None) => Some((username.clone(), String::new())),
            _ => None,
        };
        Ok(Self {
            client,
            config,
            basic_auth,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// One binary health point. Transport errors read as down.
    pub async fn run(&self) -> Vec<MetricPoint> {
        let value = match self.check().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, probe = %self.config.name, url = %self.config.url, "http probe request failed");
                0.0
            }
        };
        debug!(probe = %self.config.name, value, "http probe");
        vec![MetricPoint {
            resource: self.config.name.clone(),
            metric: HTTP_HEALTH_CHECK.to_string(),
            value,
        }]
    }

    async fn check(&self) -> Result<f64, reqwest::Error> {
        let mut request = match self.config.method {
            HttpMethod::Head => self.client.head(&self.config.url),
            HttpMethod::Post => self.client.post(&self.config.url),
        };
        if let Some(body) = &self.config.body {
            request = request
                .header("content-type", "application/json")
                .body(body.clone());
        }
        if let Some((username, password)) = &self.basic_auth {
            request = request.basic_auth(username, Some(password));
        }
        let response = request.send().await?;
        Ok(status_health(
            response.status().as_u16(),
            self.config.expect_status,
        ))
    }
}
