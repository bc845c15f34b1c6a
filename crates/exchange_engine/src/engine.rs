use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use exchange_core::{ExchangeId, ExchangeKey, ReplyRequest, StatusRequest};
use exchange_logging::{exchange_info, exchange_warn};

use crate::poller::{run_timer, PollSchedule};
use crate::transport::{ReqwestTransport, Transport, TransportSettings};
use crate::{EngineEvent, FailureKind, TransportError};

enum EngineCommand {
    PostReply {
        key: ExchangeKey,
        request: ReplyRequest,
    },
    PostStatus {
        key: ExchangeKey,
        request: StatusRequest,
    },
    FetchNewer {
        since_id: ExchangeId,
    },
    StartPolling(PollSchedule),
}

/// Runs requests on a background tokio runtime and reports results as
/// [`EngineEvent`]s. Requests are never cancelled.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut poll_url: Option<String> = None;
            while let Ok(command) = cmd_rx.recv() {
                let transport = transport.clone();
                let event_tx = event_tx.clone();
                match command {
                    EngineCommand::StartPolling(schedule) => {
                        exchange_info!(
                            "Polling {} every {:?}",
                            schedule.url,
                            schedule.interval
                        );
                        poll_url = Some(schedule.url);
                        runtime.spawn(run_timer(schedule.interval, event_tx));
                    }
                    EngineCommand::FetchNewer { since_id } => {
                        let url = poll_url.clone();
                        runtime.spawn(async move {
                            fetch_newer(transport.as_ref(), url, since_id, event_tx).await;
                        });
                    }
                    command => {
                        runtime.spawn(async move {
                            handle_post(transport.as_ref(), command, event_tx).await;
                        });
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn post_reply(&self, key: ExchangeKey, request: ReplyRequest) {
        let _ = self.cmd_tx.send(EngineCommand::PostReply { key, request });
    }

    pub fn post_status(&self, key: ExchangeKey, request: StatusRequest) {
        let _ = self.cmd_tx.send(EngineCommand::PostStatus { key, request });
    }

    pub fn fetch_newer(&self, since_id: ExchangeId) {
        let _ = self.cmd_tx.send(EngineCommand::FetchNewer { since_id });
    }

    /// Starts the poll timer. The first `PollDue` arrives one interval from now.
    pub fn start_polling(&self, schedule: PollSchedule) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling(schedule));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn fetch_newer(
    transport: &dyn Transport,
    url: Option<String>,
    since_id: ExchangeId,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let result = match url {
        Some(url) => transport.fetch_newer(&url, since_id).await,
        None => Err(TransportError::new(
            FailureKind::NotConfigured,
            "polling has not been started",
        )),
    };
    if let Err(err) = &result {
        exchange_warn!("Poll since_id={} failed: {}", since_id, err);
    }
    let _ = event_tx.send(EngineEvent::PollCompleted { since_id, result });
}

async fn handle_post(
    transport: &dyn Transport,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::PostReply { key, request } => {
            let result = transport.post_reply(&request).await;
            if let Err(err) = &result {
                exchange_warn!("Reply for key={} failed: {}", key, err);
            }
            EngineEvent::ReplyCompleted { key, result }
        }
        EngineCommand::PostStatus { key, request } => {
            let result = transport.post_status(&request).await;
            if let Err(err) = &result {
                exchange_warn!("Status update for key={} failed: {}", key, err);
            }
            EngineEvent::StatusCompleted { key, result }
        }
        EngineCommand::FetchNewer { .. } | EngineCommand::StartPolling(_) => return,
    };
    let _ = event_tx.send(event);
}
