use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ExchangeId, StatusCode};

/// Field set accepted by [`crate::Exchange::create`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExchangeFields {
    /// Raw identifier; the first run of digits becomes the exchange id.
    pub id: String,
    pub status: Option<StatusCode>,
    pub details: String,
    pub message: String,
    pub responses: Vec<String>,
    pub name: String,
    pub date_str: String,
}

/// Exchange record as served by the poll endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    pub id: RecordId,
    #[serde(default)]
    pub status: Option<StatusCode>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub details: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_responses")]
    pub responses: Vec<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub date_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    pub fn to_raw(&self) -> String {
        match self {
            RecordId::Number(id) => id.to_string(),
            RecordId::Text(text) => text.clone(),
        }
    }
}

impl From<ExchangeRecord> for ExchangeFields {
    fn from(record: ExchangeRecord) -> Self {
        Self {
            id: record.id.to_raw(),
            status: record.status,
            details: record.details,
            message: record.message,
            responses: record.responses,
            name: record.name,
            date_str: record.date_str,
        }
    }
}

/// Reply submission payload. The transport adds the auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyRequest {
    pub id: ExchangeId,
    pub msg: String,
}

/// Server acknowledgment of a reply: canonical text and resulting status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplyAck {
    pub sms: String,
    pub status: StatusCode,
}

/// Generic status-changing request, e.g. marking an exchange received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRequest {
    pub id: ExchangeId,
    pub status: StatusCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusAck {
    pub status: StatusCode,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Anything that is not an array reads as no responses. Items may be plain
// strings or `{"msg": ...}` objects.
fn lenient_responses<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().map(response_text).collect())
}

fn response_text(item: Value) -> String {
    match item {
        Value::String(text) => text,
        Value::Object(ref map) => match map.get("msg") {
            Some(Value::String(text)) => text.clone(),
            _ => item.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ExchangeRecord, RecordId};

    #[test]
    fn non_array_responses_read_as_empty() {
        let record: ExchangeRecord =
            serde_json::from_str(r#"{"id": 5, "responses": "nope"}"#).unwrap();
        assert!(record.responses.is_empty());
        assert_eq!(record.id, RecordId::Number(5));
    }

    #[test]
    fn object_responses_use_msg_field() {
        let record: ExchangeRecord = serde_json::from_str(
            r#"{"id": "9", "responses": [{"msg": "hi"}, "there", 3]}"#,
        )
        .unwrap();
        assert_eq!(record.responses, vec!["hi", "there", "3"]);
    }

    #[test]
    fn null_text_fields_default_to_empty() {
        let record: ExchangeRecord =
            serde_json::from_str(r#"{"id": 1, "details": null, "status": null}"#).unwrap();
        assert_eq!(record.details, "");
        assert_eq!(record.status, None);
    }
}
