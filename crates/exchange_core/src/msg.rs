use crate::{
    ContainerHandle, ExchangeFields, ExchangeKey, ExchangeRecord, ReplyAck, StatusAck, StatusCode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Bind the store to its rendering container.
    PlaceIn(ContainerHandle),
    /// Exchanges imported from page markup, appended in document order.
    ExchangesLoaded(Vec<ExchangeFields>),
    /// User clicked a summary row.
    ExchangeClicked(ExchangeKey),
    /// User edited the reply box of an exchange.
    DraftChanged { key: ExchangeKey, text: String },
    /// User asked to send the current draft.
    ReplySubmitted { key: ExchangeKey },
    /// Server acknowledged a reply.
    ReplyDelivered { key: ExchangeKey, ack: ReplyAck },
    /// Reply request failed; the optimistic entry stays pending.
    ReplyFailed { key: ExchangeKey, reason: String },
    /// User asked for a status change, e.g. marking an exchange received.
    StatusRequested { key: ExchangeKey, status: StatusCode },
    /// Server acknowledged a status change.
    StatusDelivered { key: ExchangeKey, ack: StatusAck },
    /// Status request failed.
    StatusFailed { key: ExchangeKey, reason: String },
    /// Poll timer fired.
    PollDue,
    /// Poll answered with records, newest batch in server order.
    PollResults(Vec<ExchangeRecord>),
    /// Poll request failed; retried on the next tick.
    PollFailed { reason: String },
}
