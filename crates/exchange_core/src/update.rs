use exchange_logging::{exchange_debug, exchange_info, exchange_warn};

use crate::{Effect, ExchangeFields, ExchangeStore, Msg, Placement, StatusCode, StatusRequest};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ExchangeStore, msg: Msg) -> (ExchangeStore, Vec<Effect>) {
    let effects = match msg {
        Msg::PlaceIn(container) => {
            state.place_in(container);
            Vec::new()
        }
        Msg::ExchangesLoaded(batch) => {
            let inserted = state.import_batch(batch, Placement::Append);
            report_import(&state, "markup", inserted.len());
            Vec::new()
        }
        Msg::ExchangeClicked(key) => {
            if let Err(err) = state.toggle_expanded(key) {
                exchange_warn!("Ignoring click: {}", err);
            }
            Vec::new()
        }
        Msg::DraftChanged { key, text } => {
            if let Err(err) = state.set_draft(key, text) {
                exchange_warn!("Ignoring draft edit: {}", err);
            }
            Vec::new()
        }
        Msg::ReplySubmitted { key } => match state.submit_draft(key) {
            Ok(request) => {
                exchange_debug!(
                    "Optimistic reply key={} id={} len={}",
                    key,
                    request.id,
                    request.msg.len()
                );
                vec![Effect::PostReply { key, request }]
            }
            Err(err) => {
                exchange_debug!("Reply rejected for key={}: {}", key, err);
                Vec::new()
            }
        },
        Msg::ReplyDelivered { key, ack } => {
            if let Err(err) = state.reconcile_reply(key, ack) {
                exchange_warn!("Dropping reply acknowledgment: {}", err);
            }
            Vec::new()
        }
        Msg::ReplyFailed { key, reason } => {
            // No retry and no timeout: the optimistic entry stays pending.
            exchange_warn!("Reply for key={} left unreconciled: {}", key, reason);
            Vec::new()
        }
        Msg::StatusRequested { key, status } => {
            let Some(id) = state.exchange(key).map(|exchange| exchange.id()) else {
                exchange_warn!("Ignoring status request for unknown key={}", key);
                return (state, Vec::new());
            };
            if let Err(err) = state.set_status(key, StatusCode::pending()) {
                exchange_warn!("Ignoring status request: {}", err);
                return (state, Vec::new());
            }
            vec![Effect::PostStatus {
                key,
                request: StatusRequest { id, status },
            }]
        }
        Msg::StatusDelivered { key, ack } => {
            if let Err(err) = state.set_status(key, ack.status) {
                exchange_warn!("Dropping status acknowledgment: {}", err);
            }
            Vec::new()
        }
        Msg::StatusFailed { key, reason } => {
            exchange_warn!("Status request for key={} left unreconciled: {}", key, reason);
            Vec::new()
        }
        Msg::PollDue => {
            exchange_debug!("Poll due since_id={}", state.max_id());
            vec![Effect::FetchNewer {
                since_id: state.max_id(),
            }]
        }
        Msg::PollResults(records) => {
            let batch: Vec<ExchangeFields> = records.into_iter().map(Into::into).collect();
            let inserted = state.import_batch(batch, Placement::Prepend);
            report_import(&state, "poll", inserted.len());
            Vec::new()
        }
        Msg::PollFailed { reason } => {
            exchange_warn!("Poll failed, retrying next cycle: {}", reason);
            Vec::new()
        }
    };

    (state, effects)
}

fn report_import(state: &ExchangeStore, source: &str, inserted: usize) {
    for failure in state.import_failures() {
        exchange_warn!(
            "Skipped {} exchange #{}: {}",
            source,
            failure.index,
            failure.error
        );
    }
    if inserted > 0 {
        exchange_info!(
            "Merged {} {} exchange(s), max_id={}",
            inserted,
            source,
            state.max_id()
        );
    }
}
