use std::fmt;

use exchange_core::{ExchangeId, ExchangeKey, ExchangeRecord, ReplyAck, StatusAck};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Poll timer fired; the owner answers with the current high-water mark.
    PollDue,
    PollCompleted {
        since_id: ExchangeId,
        result: Result<Vec<ExchangeRecord>, TransportError>,
    },
    ReplyCompleted {
        key: ExchangeKey,
        result: Result<ReplyAck, TransportError>,
    },
    StatusCompleted {
        key: ExchangeKey,
        result: Result<StatusAck, TransportError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    NotConfigured,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::NotConfigured => write!(f, "endpoint not configured"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
