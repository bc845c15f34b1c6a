use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ExchangeFields, ExchangeRecord, Translations};

pub type ExchangeId = u64;

/// Maximum reply cost, in counted characters, accepted for submission.
pub const CHARACTER_LIMIT: usize = 160;

/// Counted cost of a UTF-16 code unit at or above [`NARROW_UNIT_BOUND`].
const WIDE_UNIT_COST: usize = 7;
const NARROW_UNIT_BOUND: u16 = 122;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("exchange id {0:?} contains no digits")]
    InvalidId(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("reply is empty")]
    EmptyMessage,
    #[error("reply is too long ({count} counted characters, limit {limit})")]
    MessageTooLong { count: usize, limit: usize },
}

/// Server-defined status code of an exchange. Unset statuses read as `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(String);

impl StatusCode {
    pub const PENDING: &'static str = "pending";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn pending() -> Self {
        Self::new(Self::PENDING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pending(&self) -> bool {
        self.0 == Self::PENDING
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for StatusCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One conversation thread: the original inbound message plus its replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    id: ExchangeId,
    status: Option<StatusCode>,
    details: String,
    message: String,
    responses: Vec<String>,
    name: String,
    date_str: String,
    draft_message: String,
    // Indices into `responses` still awaiting a server acknowledgment, oldest first.
    pending_responses: Vec<usize>,
}

impl Exchange {
    pub fn create(fields: ExchangeFields) -> Result<Self, ExchangeError> {
        let id = parse_exchange_id(&fields.id)?;
        Ok(Self {
            id,
            status: fields.status,
            details: fields.details,
            message: fields.message,
            responses: fields.responses,
            name: fields.name,
            date_str: fields.date_str,
            draft_message: String::new(),
            pending_responses: Vec::new(),
        })
    }

    /// Builds an exchange from its JSON wire shape.
    pub fn from_record(record: ExchangeRecord) -> Result<Self, ExchangeError> {
        Self::create(record.into())
    }

    pub fn id(&self) -> ExchangeId {
        self.id
    }

    pub fn status(&self) -> Option<&StatusCode> {
        self.status.as_ref()
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date_str(&self) -> &str {
        &self.date_str
    }

    pub fn draft_message(&self) -> &str {
        &self.draft_message
    }

    /// Number of appended replies not yet acknowledged by the server.
    pub fn pending_response_count(&self) -> usize {
        self.pending_responses.len()
    }

    pub fn response_count_summary(&self, translations: &Translations) -> String {
        translations.pluralize(self.responses.len())
    }

    pub fn current_status_code(&self) -> StatusCode {
        self.status.clone().unwrap_or_else(StatusCode::pending)
    }

    /// Updates the stored status only. Rendered views are refreshed through
    /// [`crate::ExchangeStore::set_status`].
    pub fn set_status(&mut self, code: StatusCode) {
        self.status = Some(code);
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft_message = text.into();
    }

    /// Validates and appends a reply, clearing the draft. Returns the index of
    /// the appended response, which stays pending until reconciled.
    pub fn append_draft_response(&mut self, text: &str) -> Result<usize, SubmitError> {
        validate_reply(text)?;
        self.responses.push(text.to_string());
        let index = self.responses.len() - 1;
        self.pending_responses.push(index);
        self.draft_message.clear();
        Ok(index)
    }

    /// Replaces the most recently appended pending response with the
    /// server's canonical text. Returns the replaced index, if any.
    pub fn reconcile_latest_pending(&mut self, canonical: impl Into<String>) -> Option<usize> {
        let index = self.pending_responses.pop()?;
        if let Some(slot) = self.responses.get_mut(index) {
            *slot = canonical.into();
        }
        Some(index)
    }
}

fn parse_exchange_id(raw: &str) -> Result<ExchangeId, ExchangeError> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits
        .parse()
        .map_err(|_| ExchangeError::InvalidId(raw.to_string()))
}

/// Counted length of a reply. Each UTF-16 code unit below 122 costs 1,
/// anything else costs 7.
pub fn count_characters(text: &str) -> usize {
    text.encode_utf16()
        .map(|unit| {
            if unit < NARROW_UNIT_BOUND {
                1
            } else {
                WIDE_UNIT_COST
            }
        })
        .sum()
}

/// Remaining budget before [`CHARACTER_LIMIT`]; negative means over limit.
pub fn remaining_characters(text: &str) -> i64 {
    CHARACTER_LIMIT as i64 - count_characters(text) as i64
}

pub fn validate_reply(text: &str) -> Result<(), SubmitError> {
    if text.trim().is_empty() {
        return Err(SubmitError::EmptyMessage);
    }
    let count = count_characters(text);
    if count > CHARACTER_LIMIT {
        return Err(SubmitError::MessageTooLong {
            count,
            limit: CHARACTER_LIMIT,
        });
    }
    Ok(())
}
