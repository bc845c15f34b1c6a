use exchange_core::{Exchange, ExchangeError, ExchangeFields, StatusCode};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("invalid selector {0:?}")]
    InvalidSelector(String),
    #[error("markup is missing {missing}")]
    MalformedMarkup { missing: &'static str },
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// CSS selectors locating the parts of an exchange in page markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSelectors {
    /// One node per exchange.
    pub exchange: String,
    pub details: String,
    /// Inside `details`; its `title` attribute holds the status code.
    pub status: String,
    /// Inside `details`.
    pub date: String,
    pub message: String,
    pub response: String,
    /// Input whose `name` attribute embeds the exchange id.
    pub reply_input: String,
}

impl Default for MarkupSelectors {
    fn default() -> Self {
        Self {
            exchange: ".exchange".to_string(),
            details: ".details".to_string(),
            status: ".status".to_string(),
            date: ".date".to_string(),
            message: ".msg.text".to_string(),
            response: ".msg.response".to_string(),
            reply_input: "input.resp_box".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct MarkupImporter {
    exchange: Selector,
    details: Selector,
    status: Selector,
    date: Selector,
    message: Selector,
    response: Selector,
    reply_input: Selector,
}

impl MarkupImporter {
    pub fn new(selectors: &MarkupSelectors) -> Result<Self, ImportError> {
        Ok(Self {
            exchange: compile(&selectors.exchange)?,
            details: compile(&selectors.details)?,
            status: compile(&selectors.status)?,
            date: compile(&selectors.date)?,
            message: compile(&selectors.message)?,
            response: compile(&selectors.response)?,
            reply_input: compile(&selectors.reply_input)?,
        })
    }

    /// Imports every exchange node of a document, in document order. Each node
    /// succeeds or fails on its own.
    pub fn import_document(&self, html: &str) -> Vec<Result<ExchangeFields, ImportError>> {
        let doc = Html::parse_document(html);
        doc.select(&self.exchange)
            .map(|node| self.fields_from_element(node))
            .collect()
    }

    pub fn exchange_from_element(&self, node: ElementRef<'_>) -> Result<Exchange, ImportError> {
        Ok(Exchange::create(self.fields_from_element(node)?)?)
    }

    /// Extracts the exchange fields held by one exchange node.
    ///
    /// `name` is the second space-separated token of the second line of the
    /// normalized details text.
    pub fn fields_from_element(&self, node: ElementRef<'_>) -> Result<ExchangeFields, ImportError> {
        let details_node = node
            .select(&self.details)
            .next()
            .ok_or(ImportError::MalformedMarkup { missing: "details" })?;
        let message_node = node
            .select(&self.message)
            .next()
            .ok_or(ImportError::MalformedMarkup { missing: "message" })?;
        let id = node
            .select(&self.reply_input)
            .next()
            .and_then(|input| input.value().attr("name"))
            .ok_or(ImportError::MalformedMarkup {
                missing: "reply input name",
            })?;

        let details = normalize_lines(&text_of(details_node));
        let name = details
            .split('\n')
            .nth(1)
            .ok_or(ImportError::MalformedMarkup {
                missing: "details name line",
            })?
            .split(' ')
            .nth(1)
            .unwrap_or_default()
            .to_string();

        let status = details_node
            .select(&self.status)
            .next()
            .and_then(|status| status.value().attr("title"))
            .map(StatusCode::new);
        let date_str = details_node
            .select(&self.date)
            .map(text_of)
            .collect::<String>();
        let responses = node.select(&self.response).map(text_of).collect();

        Ok(ExchangeFields {
            id: id.to_string(),
            status,
            details,
            message: text_of(message_node).trim().to_string(),
            responses,
            name,
            date_str,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ImportError> {
    Selector::parse(selector).map_err(|_| ImportError::InvalidSelector(selector.to_string()))
}

fn text_of(node: ElementRef<'_>) -> String {
    node.text().collect()
}

/// Trims the text, then trims every line of it.
fn normalize_lines(text: &str) -> String {
    text.trim()
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}
