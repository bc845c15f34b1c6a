use std::time::Duration;

use exchange_core::{
    ExchangeId, ExchangeRecord, ReplyAck, ReplyRequest, StatusAck, StatusRequest,
};
use exchange_logging::{exchange_debug, exchange_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{FailureKind, TransportError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    /// Whole-request timeout. `None` leaves requests in flight indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_bytes: u64,
    pub reply_url: String,
    pub status_url: String,
    /// Opaque auth token sent with every POST.
    pub token: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_bytes: 1024 * 1024,
            reply_url: String::new(),
            status_url: String::new(),
            token: String::new(),
        }
    }
}

/// Request/response contract of the exchange server.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_reply(&self, request: &ReplyRequest) -> Result<ReplyAck, TransportError>;

    async fn post_status(&self, request: &StatusRequest) -> Result<StatusAck, TransportError>;

    /// GET `url?id=<since_id>`. Records that fail to parse are skipped.
    async fn fetch_newer(
        &self,
        url: &str,
        since_id: ExchangeId,
    ) -> Result<Vec<ExchangeRecord>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        pairs: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let url = parse_endpoint(url)?;
        let body = {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            for (name, value) in pairs {
                form.append_pair(name, value);
            }
            form.append_pair("token", &self.settings.token);
            form.finish()
        };

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_body(response).await?;
        serde_json::from_slice(&body)
            .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_reply(&self, request: &ReplyRequest) -> Result<ReplyAck, TransportError> {
        let pairs = [
            ("id", request.id.to_string()),
            ("msg", request.msg.clone()),
        ];
        self.post_form(&self.settings.reply_url, &pairs).await
    }

    async fn post_status(&self, request: &StatusRequest) -> Result<StatusAck, TransportError> {
        let pairs = [
            ("id", request.id.to_string()),
            ("status", request.status.as_str().to_string()),
        ];
        self.post_form(&self.settings.status_url, &pairs).await
    }

    async fn fetch_newer(
        &self,
        url: &str,
        since_id: ExchangeId,
    ) -> Result<Vec<ExchangeRecord>, TransportError> {
        let mut url = parse_endpoint(url)?;
        url.query_pairs_mut()
            .append_pair("id", &since_id.to_string());
        exchange_debug!("Polling {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_body(response).await?;
        parse_records(&body)
    }
}

/// Parses a poll body: a JSON array of exchange records. Items that do not
/// match the record shape are logged and skipped.
pub fn parse_records(body: &[u8]) -> Result<Vec<ExchangeRecord>, TransportError> {
    let items: Vec<Value> = serde_json::from_slice(body)
        .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))?;
    let records = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                exchange_warn!("Skipping poll record #{}: {}", index, err);
                None
            }
        })
        .collect();
    Ok(records)
}

fn parse_endpoint(url: &str) -> Result<reqwest::Url, TransportError> {
    if url.trim().is_empty() {
        return Err(TransportError::new(
            FailureKind::NotConfigured,
            "no endpoint url",
        ));
    }
    reqwest::Url::parse(url)
        .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn too_large(max_bytes: u64, actual: u64) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
