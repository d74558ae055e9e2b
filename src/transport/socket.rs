// Push Transport
//
// Persistent socket connection to the presence service. Protocol:
// inbound op 1 (hello) carries the heartbeat interval; we then subscribe
// to the tracked identity (op 2) and send op 3 heartbeats on the server's
// schedule. Op 0 frames tagged INIT_STATE / PRESENCE_UPDATE carry
// snapshots. Any close or error schedules a backoff reconnect.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, Interval};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::SocketConfig;
use crate::error::CardError;
use crate::model::{PresenceSnapshot, SocketFrame, WirePresence};
use crate::transport::{Backoff, Transport};

const OP_EVENT: u8 = 0;
const OP_HELLO: u8 = 1;
const OP_SUBSCRIBE: u8 = 2;
const OP_HEARTBEAT: u8 = 3;

const DEFAULT_HEARTBEAT_MS: u64 = 30_000;

enum SessionEnd {
    /// Widget side dropped the channel; shut down for good.
    ReceiverClosed,
    /// Connection closed or errored; reconnect.
    ConnectionLost,
}

pub struct SocketTransport {
    url: String,
    user_id: String,
    backoff: Backoff,
}

impl SocketTransport {
    pub fn new(config: &SocketConfig, user_id: &str) -> Self {
        Self {
            url: config.url.clone(),
            user_id: user_id.to_string(),
            backoff: Backoff::new(
                Duration::from_millis(config.initial_backoff_ms),
                Duration::from_millis(config.max_backoff_ms),
            ),
        }
    }

    async fn session(
        &mut self,
        tx: &mpsc::Sender<PresenceSnapshot>,
    ) -> Result<SessionEnd, CardError> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        info!("presence socket connected: {}", self.url);
        self.backoff.reset();

        let (mut write, mut read) = stream.split();
        // Unknown until the hello frame arrives.
        let mut heartbeat: Option<Interval> = None;

        loop {
            tokio::select! {
                received = read.next() => {
                    let message = match received {
                        None => return Ok(SessionEnd::ConnectionLost),
                        Some(Err(e)) => {
                            warn!("socket read error: {}", e);
                            return Ok(SessionEnd::ConnectionLost);
                        }
                        Some(Ok(message)) => message,
                    };

                    match message {
                        Message::Text(text) => {
                            let frame: SocketFrame = match serde_json::from_str(text.as_str()) {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!("dropped malformed socket frame: {}", e);
                                    continue;
                                }
                            };
                            match frame.op {
                                OP_HELLO => {
                                    let period_ms = frame
                                        .d
                                        .as_ref()
                                        .and_then(|d| d.get("heartbeat_interval"))
                                        .and_then(|v| v.as_u64())
                                        .unwrap_or(DEFAULT_HEARTBEAT_MS);
                                    let period = Duration::from_millis(period_ms);
                                    heartbeat = Some(interval_at(Instant::now() + period, period));
                                    debug!("hello received, heartbeat every {}ms", period_ms);

                                    let subscribe = json!({
                                        "op": OP_SUBSCRIBE,
                                        "d": { "subscribe_to_id": self.user_id },
                                    });
                                    write.send(Message::Text(subscribe.to_string().into())).await?;
                                }
                                OP_EVENT => {
                                    let relevant = matches!(
                                        frame.t.as_deref(),
                                        Some("INIT_STATE") | Some("PRESENCE_UPDATE")
                                    );
                                    if !relevant {
                                        continue;
                                    }
                                    let Some(d) = frame.d else { continue };
                                    match serde_json::from_value::<WirePresence>(d) {
                                        Ok(wire) => {
                                            let snapshot =
                                                PresenceSnapshot::from_wire(wire, &self.user_id);
                                            if tx.send(snapshot).await.is_err() {
                                                return Ok(SessionEnd::ReceiverClosed);
                                            }
                                        }
                                        Err(e) => warn!("dropped malformed presence event: {}", e),
                                    }
                                }
                                other => debug!("ignoring socket frame op {}", other),
                            }
                        }
                        Message::Ping(payload) => {
                            write.send(Message::Pong(payload)).await?;
                        }
                        Message::Close(_) => return Ok(SessionEnd::ConnectionLost),
                        _ => {}
                    }
                }
                _ = async { heartbeat.as_mut().unwrap().tick().await }, if heartbeat.is_some() => {
                    let beat = json!({ "op": OP_HEARTBEAT });
                    write.send(Message::Text(beat.to_string().into())).await?;
                }
            }
        }
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn run(&mut self, tx: mpsc::Sender<PresenceSnapshot>) -> Result<(), CardError> {
        loop {
            match self.session(&tx).await {
                Ok(SessionEnd::ReceiverClosed) => return Ok(()),
                Ok(SessionEnd::ConnectionLost) => {
                    warn!("presence socket lost");
                }
                Err(e) => {
                    warn!("presence socket error: {}", e);
                }
            }

            let delay = self.backoff.next_delay();
            info!("reconnecting in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
