use std::time::Duration;

use anyhow::Result;
use tracing::warn;

/// Configuration for retry behaviour on POST requests.
pub struct RetryConfig {
    pub max_retries: usize,
    pub delays: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: vec![1, 2, 4],
        }
    }
}

/// Retry an HTTP POST with exponential backoff.
///
/// Retries on network errors and 5xx responses.
/// Returns immediately on success or 4xx.
pub async fn retry_post(
    client: &reqwest::Client,
    url: &str,
    auth_token: Option<&str>,
    body: &serde_json::Value,
    config: &RetryConfig,
) -> Result<reqwest::Response> {
    let max_attempts = config.max_retries + 1;
    let mut last_err: Option<anyhow::Error> = None;

    for attempt in 0..max_attempts {
        let mut req = client.post(url).header("Content-Type", "application/json");
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }

        match req.json(body).send().await {
            Ok(resp) if resp.status().is_server_error() => {
                if attempt < config.delays.len() {
                    warn!(
                        "POST attempt {}/{} failed (HTTP {}), retrying in {}s…",
                        attempt + 1,
                        max_attempts,
                        resp.status(),
                        config.delays[attempt],
                    );
                    tokio::time::sleep(Duration::from_secs(config.delays[attempt])).await;
                } else {
                    return Ok(resp);
                }
            }
            Ok(resp) => return Ok(resp),
            Err(e) => {
                if attempt < config.delays.len() {
                    warn!(
                        "POST attempt {}/{} failed ({}), retrying in {}s…",
                        attempt + 1,
                        max_attempts,
                        e,
                        config.delays[attempt],
                    );
                    tokio::time::sleep(Duration::from_secs(config.delays[attempt])).await;
                    last_err = Some(e.into());
                } else {
                    return Err(e.into());
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("retry budget exhausted for POST {url}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_backs_off_exponentially() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.delays, vec![1, 2, 4]);
    }
}
