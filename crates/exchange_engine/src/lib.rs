//! Exchange engine: HTTP transport, poll timer and markup import.
mod decode;
mod engine;
mod markup;
mod poller;
mod transport;
mod types;

pub use decode::{decode_markup, DecodeError, DecodedMarkup};
pub use engine::EngineHandle;
pub use markup::{ImportError, MarkupImporter, MarkupSelectors};
pub use poller::{poll_interval, PollSchedule, DEFAULT_POLL_FREQUENCY};
pub use transport::{parse_records, ReqwestTransport, Transport, TransportSettings};
pub use types::{EngineEvent, FailureKind, TransportError};
