// Pull Transport
//
// Fetches the REST presence endpoint on a fixed interval with a bounded
// per-request timeout. A timeout, network failure, or malformed body
// skips the cycle; it is never treated as an offline observation.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::PollConfig;
use crate::error::CardError;
use crate::model::{PresenceSnapshot, RestEnvelope};
use crate::transport::Transport;

pub struct PollTransport {
    client: reqwest::Client,
    user_id: String,
    base_url: String,
    interval: std::time::Duration,
}

impl PollTransport {
    pub fn new(config: &PollConfig, user_id: &str) -> Result<Self, CardError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            user_id: user_id.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            interval: std::time::Duration::from_millis(config.interval_ms),
        })
    }

    async fn fetch_once(&self) -> Result<PresenceSnapshot, CardError> {
        let url = format!("{}/v1/users/{}", self.base_url, self.user_id);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CardError::TransportError(format!(
                "presence service returned {}",
                status
            )));
        }

        let envelope: RestEnvelope = response.json().await?;
        if !envelope.success {
            return Err(CardError::TransportError(
                "presence service reported failure".to_string(),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| CardError::TransportError("envelope missing data".to_string()))?;

        Ok(PresenceSnapshot::from_wire(data, &self.user_id))
    }
}

#[async_trait]
impl Transport for PollTransport {
    async fn run(&mut self, tx: mpsc::Sender<PresenceSnapshot>) -> Result<(), CardError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.fetch_once().await {
                Ok(snapshot) => {
                    debug!("poll cycle delivered a snapshot");
                    if tx.send(snapshot).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!("poll cycle skipped: {}", e);
                }
            }
        }
    }
}
