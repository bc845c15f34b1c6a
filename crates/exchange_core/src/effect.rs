use crate::{ExchangeId, ExchangeKey, ReplyRequest, StatusRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST a reply; the answer comes back as `ReplyDelivered` or `ReplyFailed`.
    PostReply {
        key: ExchangeKey,
        request: ReplyRequest,
    },
    /// POST a status change; the answer comes back as `StatusDelivered` or `StatusFailed`.
    PostStatus {
        key: ExchangeKey,
        request: StatusRequest,
    },
    /// GET exchanges newer than the high-water mark.
    FetchNewer { since_id: ExchangeId },
}
