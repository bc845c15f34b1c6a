use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SubmitError;

/// Localized UI strings. Missing fields in a loaded table fall back to English.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Translations {
    pub response: String,
    pub responses: String,
    pub send_message: String,
    pub too_many_characters: String,
    pub empty: String,
    /// Status code to label.
    pub status: BTreeMap<String, String>,
}

impl Default for Translations {
    fn default() -> Self {
        let status = [
            ("pending", "Pending"),
            ("sent", "Sent"),
            ("failed", "Failed"),
            ("received", "Received"),
            ("success", "Success"),
            ("warning", "Warning"),
            ("error", "Error"),
            ("info", "Info"),
            ("alert", "Alert"),
            ("reminder", "Reminder"),
            ("from_logger", "Response from logger"),
            ("system_error", "System error"),
            ("mixed", "Mixed"),
            ("parse_error", "Parse Error"),
            ("bad_value", "Bad Value"),
            ("inapplicable", "Inapplicable"),
            ("not_allowed", "Not Allowed"),
        ]
        .into_iter()
        .map(|(code, label)| (code.to_string(), label.to_string()))
        .collect();

        Self {
            response: "response".to_string(),
            responses: "responses".to_string(),
            send_message: "Send".to_string(),
            too_many_characters: "Too many characters".to_string(),
            empty: "Empty".to_string(),
            status,
        }
    }
}

impl Translations {
    /// Label for a status code; unmapped codes are shown verbatim.
    pub fn localized_label(&self, code: &str) -> String {
        self.status
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn pluralize(&self, count: usize) -> String {
        if count == 1 {
            format!("1 {}", self.response)
        } else {
            format!("{count} {}", self.responses)
        }
    }

    /// Title shown on a disabled submit control.
    pub fn submit_error_title(&self, err: &SubmitError) -> String {
        match err {
            SubmitError::EmptyMessage => self.empty.clone(),
            SubmitError::MessageTooLong { .. } => self.too_many_characters.clone(),
        }
    }
}
