use std::sync::mpsc;
use std::time::Duration;

use exchange_logging::exchange_debug;

use crate::EngineEvent;

/// Default poll frequency: four minutes.
pub const DEFAULT_POLL_FREQUENCY: u64 = 4 * 60 * 1000;

/// Values below 1000 are seconds, anything else milliseconds.
pub fn poll_interval(frequency: u64) -> Duration {
    if frequency < 1000 {
        Duration::from_secs(frequency)
    } else {
        Duration::from_millis(frequency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    pub url: String,
    pub interval: Duration,
}

impl PollSchedule {
    pub fn new(url: impl Into<String>, frequency: u64) -> Self {
        Self {
            url: url.into(),
            interval: poll_interval(frequency),
        }
    }
}

/// Emits `PollDue` every `interval`, starting one interval from now. The timer
/// does not wait on poll results; it ends only when the receiver is gone.
pub(crate) async fn run_timer(interval: Duration, event_tx: mpsc::Sender<EngineEvent>) {
    let mut cycle: u64 = 0;
    loop {
        tokio::time::sleep(interval).await;
        cycle += 1;
        exchange_debug!("Poll cycle {}", cycle);
        if event_tx.send(EngineEvent::PollDue).is_err() {
            break;
        }
    }
}
