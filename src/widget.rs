// Widget Runtime
//
// Owns the reconciler state and the three timer slots (transient hide,
// offline last-seen ticker, track progress ticker), all driven from one
// select loop. Snapshots are processed to completion before the next is
// received, and starting a slot always replaces the previous timer, so
// at most one timer per slot ever exists.

use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::debug;

use crate::cache::LastSeenCache;
use crate::model::{PresenceSnapshot, Status};
use crate::projector;
use crate::reconciler::{self, ReconcilerState, UiIntent, LAST_SEEN_TICK_MS, TRANSIENT_HIDE_MS};
use crate::sink::PresentationSink;

/// Millisecond clock source. Injected so the reconciliation flow is
/// testable without real wall time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// The live presence widget for a single tracked identity.
pub struct PresenceWidget {
    state: ReconcilerState,
    sink: Box<dyn PresentationSink>,
    clock: Box<dyn Clock>,
    cache: Option<LastSeenCache>,
}

impl PresenceWidget {
    pub fn new(sink: Box<dyn PresentationSink>, clock: Box<dyn Clock>) -> Self {
        Self {
            state: ReconcilerState::default(),
            sink,
            clock,
            cache: None,
        }
    }

    /// Attach the optional last-seen cache, seeding the reconciler with
    /// the remembered reference point.
    pub fn with_cache(mut self, cache: Option<LastSeenCache>) -> Self {
        if let Some(cache) = &cache {
            if let Some(ms) = cache.load() {
                debug!("seeded last-seen reference from cache: {}", ms);
                self.state.last_active_ms = Some(ms);
            }
        }
        self.cache = cache;
        self
    }

    /// Consume snapshots until the transport side closes the channel.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PresenceSnapshot>) {
        let mut transient_hide: Option<Pin<Box<Sleep>>> = None;
        let mut last_seen_tick: Option<Interval> = None;
        let mut track_tick: Option<Interval> = None;

        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some(snapshot) = received else { break };
                    let prev_status = self.state.current_status;
                    let prev_window = self.state.track_window;
                    let now = self.clock.now_ms();

                    let intents = reconciler::reconcile(&mut self.state, &snapshot, now);
                    let showed_transient = intents
                        .iter()
                        .any(|i| matches!(i, UiIntent::ShowTransient(_)));
                    for intent in intents {
                        self.sink.apply(intent).await;
                    }

                    // Transient slot: replacing the one-shot cancels any
                    // pending hide from an earlier transition.
                    if showed_transient {
                        transient_hide =
                            Some(Box::pin(sleep(Duration::from_millis(TRANSIENT_HIDE_MS))));
                    } else if !self.state.transient_active {
                        transient_hide = None;
                    }

                    // Offline ticker slot.
                    if self.state.offline_ticker_running {
                        if last_seen_tick.is_none() {
                            last_seen_tick = Some(ticker(LAST_SEEN_TICK_MS));
                        }
                    } else {
                        last_seen_tick = None;
                    }

                    // Track ticker slot: restarted when the playing window
                    // changes, stopped when there is nothing to tick.
                    if self.state.track_window.is_none() {
                        track_tick = None;
                    } else if self.state.track_window != prev_window || track_tick.is_none() {
                        track_tick = Some(ticker(projector::TICK_MS));
                    }

                    if prev_status != Status::Offline
                        && self.state.current_status == Status::Offline
                    {
                        self.persist_last_seen();
                    }
                }
                _ = async { transient_hide.as_mut().unwrap().await }, if transient_hide.is_some() => {
                    transient_hide = None;
                    if self.state.transient_active {
                        self.state.transient_active = false;
                        self.sink.apply(UiIntent::HideTransient).await;
                    }
                }
                _ = async { last_seen_tick.as_mut().unwrap().tick().await }, if last_seen_tick.is_some() => {
                    let text =
                        reconciler::last_seen_text(self.state.last_active_ms, self.clock.now_ms());
                    self.sink.apply(UiIntent::SetLastSeenText(text)).await;
                }
                _ = async { track_tick.as_mut().unwrap().tick().await }, if track_tick.is_some() => {
                    if let Some((start, end)) = self.state.track_window {
                        let frame = projector::project(start, end, self.clock.now_ms());
                        self.sink
                            .apply(UiIntent::SetTrackProgress {
                                percent: frame.percent,
                                elapsed: frame.elapsed,
                                total: frame.total,
                            })
                            .await;
                    }
                }
            }
        }

        self.persist_last_seen();
    }

    fn persist_last_seen(&self) {
        if let (Some(cache), Some(ms)) = (&self.cache, self.state.last_active_ms) {
            cache.store(ms);
        }
    }
}

/// 1 Hz-style ticker whose first tick fires one period from now (the
/// initial frame is emitted by the reconcile pass itself).
fn ticker(period_ms: u64) -> Interval {
    let period = Duration::from_millis(period_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
