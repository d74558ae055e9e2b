// Transports
//
// Two interchangeable ways of feeding snapshots to the widget: repeated
// REST polling, or the push socket with heartbeat + subscribe. Both are
// retried forever; a failed cycle only means no new information.

pub mod poll;
pub mod socket;

use std::cmp;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::CardError;
use crate::model::PresenceSnapshot;

pub use poll::PollTransport;
pub use socket::SocketTransport;

/// Unified transport trait. `run` feeds snapshots into the channel until
/// the receiving side goes away, then returns `Ok`.
#[async_trait]
pub trait Transport: Send {
    async fn run(&mut self, tx: mpsc::Sender<PresenceSnapshot>) -> Result<(), CardError>;
}

/// Reconnect delay: starts at the initial value, grows by 1.5x per failed
/// attempt, capped, and reset after any successful open.
#[derive(Debug)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// The delay to wait before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = cmp::min(self.current.mul_f64(1.5), self.max);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let mut backoff = Backoff::new(Duration::from_millis(1000), Duration::from_millis(30000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1500));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2250));

        for _ in 0..20 {
            backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), Duration::from_millis(30000));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }
}
