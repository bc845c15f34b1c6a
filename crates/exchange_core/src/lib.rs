//! Exchange core: pure state machine for the exchange list, the reply
//! pipeline and poll merging.
mod effect;
mod exchange;
mod msg;
mod record;
mod state;
mod translations;
mod update;
mod view_model;

pub use effect::Effect;
pub use exchange::{
    count_characters, remaining_characters, validate_reply, Exchange, ExchangeError, ExchangeId,
    StatusCode, SubmitError, CHARACTER_LIMIT,
};
pub use msg::Msg;
pub use record::{
    ExchangeFields, ExchangeRecord, RecordId, ReplyAck, ReplyRequest, StatusAck, StatusRequest,
};
pub use state::{
    submit_affordance, ContainerHandle, ExchangeKey, ExchangeStore, ImportFailure, Placement,
    StoreError,
};
pub use translations::Translations;
pub use update::update;
pub use view_model::{
    apply_view_updates, DetailView, ListViewModel, RenderBoundary, SubmitAffordance, SummaryRow,
    ViewHandle, ViewKind, ViewUpdate,
};
