// Report publishing: webhook POST or log sink.

use serde::Serialize;
use tracing::{info, warn};

/// Where rendered reports go. `Log` is the fallback when no webhook is
/// configured, and what tests use.
pub enum Notifier {
    Webhook { client: reqwest::Client, url: String },
    Log,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    message: &'a str,
}

impl Notifier {
    pub fn from_config(webhook_url: Option<String>) -> Self {
        match webhook_url {
            Some(url) => Self::Webhook {
                client: reqwest::Client::new(),
                url,
            },
            None => {
                info!("no reporting.webhook_url configured; reports go to the log");
                Self::Log
            }
        }
    }

    /// Publish failures are logged, not returned: a lost notification does
    /// not fail the report pass.
    pub async fn publish(&self, subject: &str, message: &str) {
        match self {
            Self::Webhook { client, url } => {
                let payload = WebhookPayload { subject, message };
                match client.post(url).json(&payload).send().await {
                    Ok(response) if response.status().is_success() => {
                        info!(subject, "report published");
                    }
                    Ok(response) => {
                        warn!(subject, status = %response.status(), "webhook rejected report");
                    }
                    Err(e) => {
                        warn!(subject, error = %e, "webhook send failed");
                    }
                }
            }
            Self::Log => {
                info!(subject, "uptime report:\n{}", message);
            }
        }
    }
}
