use exchange_core::{Effect, Msg};
use exchange_engine::{EngineEvent, EngineHandle, PollSchedule};
use exchange_logging::{exchange_debug, exchange_info};

use super::config::AppConfig;

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    schedule: Option<PollSchedule>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(config.transport_settings())?;
        Ok(Self {
            engine,
            schedule: config.poll_schedule(),
        })
    }

    pub fn start_polling(&self) {
        match &self.schedule {
            Some(schedule) => self.engine.start_polling(schedule.clone()),
            None => exchange_info!("No poll_url configured; polling disabled"),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PostReply { key, request } => {
                    exchange_info!(
                        "PostReply key={} id={} msg_len={}",
                        key,
                        request.id,
                        request.msg.len()
                    );
                    self.engine.post_reply(key, request);
                }
                Effect::PostStatus { key, request } => {
                    exchange_info!(
                        "PostStatus key={} id={} status={}",
                        key,
                        request.id,
                        request.status
                    );
                    self.engine.post_status(key, request);
                }
                Effect::FetchNewer { since_id } => {
                    exchange_debug!("FetchNewer since_id={}", since_id);
                    self.engine.fetch_newer(since_id);
                }
            }
        }
    }

    /// Drains every engine event received so far.
    pub fn pending_msgs(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(event_to_msg)
            .collect()
    }
}

/// Failures are already logged by the engine; they only become messages here.
pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PollDue => Msg::PollDue,
        EngineEvent::PollCompleted { since_id, result } => match result {
            Ok(records) => Msg::PollResults(records),
            Err(err) => Msg::PollFailed {
                reason: format!("since_id={since_id}: {err}"),
            },
        },
        EngineEvent::ReplyCompleted { key, result } => match result {
            Ok(ack) => Msg::ReplyDelivered { key, ack },
            Err(err) => Msg::ReplyFailed {
                key,
                reason: err.to_string(),
            },
        },
        EngineEvent::StatusCompleted { key, result } => match result {
            Ok(ack) => Msg::StatusDelivered { key, ack },
            Err(err) => Msg::StatusFailed {
                key,
                reason: err.to_string(),
            },
        },
    }
}
