use std::collections::{BTreeMap, VecDeque};

use exchange_logging::exchange_debug;
use thiserror::Error;

use crate::exchange::{remaining_characters, validate_reply};
use crate::view_model::{DetailView, ListViewModel, SubmitAffordance, SummaryRow};
use crate::{
    Exchange, ExchangeError, ExchangeFields, ExchangeId, ReplyAck, ReplyRequest, StatusCode,
    SubmitError, Translations, ViewHandle, ViewUpdate,
};

/// Store-assigned instance key. Distinct from the domain id, which may repeat.
pub type ExchangeKey = u64;

/// Opaque handle to the rendering container the store draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContainerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Add at the end; initial load order.
    Append,
    /// Add at the start; newest first.
    Prepend,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store is not placed in a container")]
    Unbound,
    #[error("unknown exchange key {0}")]
    UnknownExchange(ExchangeKey),
    #[error(transparent)]
    Import(#[from] ExchangeError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// One import that did not produce an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Position of the source item within its batch.
    pub index: usize,
    pub error: StoreError,
}

/// Ordered collection of exchanges plus the `max_id` high-water mark.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExchangeStore {
    container: Option<ContainerHandle>,
    exchanges: BTreeMap<ExchangeKey, Exchange>,
    order: VecDeque<ExchangeKey>,
    next_key: ExchangeKey,
    max_id: ExchangeId,
    expanded: Option<ExchangeKey>,
    translations: Translations,
    import_failures: Vec<ImportFailure>,
    view_updates: Vec<ViewUpdate>,
    dirty: bool,
}

impl ExchangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translations(translations: Translations) -> Self {
        Self {
            translations,
            ..Self::default()
        }
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Binds the store to its rendering container. Must precede any insert.
    pub fn place_in(&mut self, container: ContainerHandle) {
        self.container = Some(container);
        self.view_updates.push(ViewUpdate::PlaceIn(container));
        self.mark_dirty();
    }

    pub fn container(&self) -> Option<ContainerHandle> {
        self.container
    }

    pub fn max_id(&self) -> ExchangeId {
        self.max_id
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn expanded(&self) -> Option<ExchangeKey> {
        self.expanded
    }

    pub fn exchange(&self, key: ExchangeKey) -> Option<&Exchange> {
        self.exchanges.get(&key)
    }

    /// Instance keys in display order.
    pub fn keys(&self) -> Vec<ExchangeKey> {
        self.order.iter().copied().collect()
    }

    /// Domain ids in display order.
    pub fn ids(&self) -> Vec<ExchangeId> {
        self.order
            .iter()
            .filter_map(|key| self.exchanges.get(key))
            .map(Exchange::id)
            .collect()
    }

    /// Failures from the most recent import batch.
    pub fn import_failures(&self) -> &[ImportFailure] {
        &self.import_failures
    }

    pub fn create(
        &mut self,
        fields: ExchangeFields,
        placement: Placement,
    ) -> Result<ExchangeKey, StoreError> {
        self.ensure_bound()?;
        let exchange = Exchange::create(fields)?;
        self.insert(exchange, placement)
    }

    pub fn insert(
        &mut self,
        exchange: Exchange,
        placement: Placement,
    ) -> Result<ExchangeKey, StoreError> {
        self.ensure_bound()?;
        self.next_key += 1;
        let key = self.next_key;
        self.max_id = self.max_id.max(exchange.id());
        match placement {
            Placement::Append => self.order.push_back(key),
            Placement::Prepend => self.order.push_front(key),
        }
        let row = self.summary_row(key, &exchange);
        self.exchanges.insert(key, exchange);
        self.view_updates
            .push(ViewUpdate::RenderSummary { placement, row });
        self.mark_dirty();
        Ok(key)
    }

    /// Imports each item independently; failures are collected, not fatal.
    pub fn import_batch<I>(&mut self, batch: I, placement: Placement) -> Vec<ExchangeKey>
    where
        I: IntoIterator<Item = ExchangeFields>,
    {
        self.import_failures.clear();
        let mut inserted = Vec::new();
        for (index, fields) in batch.into_iter().enumerate() {
            match self.create(fields, placement) {
                Ok(key) => inserted.push(key),
                Err(error) => self.import_failures.push(ImportFailure { index, error }),
            }
        }
        inserted
    }

    /// Sets the status and refreshes every rendered view of the exchange.
    pub fn set_status(&mut self, key: ExchangeKey, code: StatusCode) -> Result<(), StoreError> {
        let exchange = self
            .exchanges
            .get_mut(&key)
            .ok_or(StoreError::UnknownExchange(key))?;
        exchange.set_status(code.clone());
        let label = self.translations.localized_label(code.as_str());
        for handle in self.rendered_views(key) {
            self.view_updates.push(ViewUpdate::StatusIndicator {
                handle,
                status: code.clone(),
                label: label.clone(),
            });
        }
        self.mark_dirty();
        Ok(())
    }

    /// Expands the exchange, collapsing any other; clicking the expanded one collapses it.
    pub fn toggle_expanded(&mut self, key: ExchangeKey) -> Result<(), StoreError> {
        if !self.exchanges.contains_key(&key) {
            return Err(StoreError::UnknownExchange(key));
        }
        let previous = self.expanded.take();
        if let Some(previous) = previous {
            self.view_updates
                .push(ViewUpdate::CollapseDetail { key: previous });
        }
        if previous != Some(key) {
            self.expand(key);
        }
        self.mark_dirty();
        Ok(())
    }

    pub fn set_draft(&mut self, key: ExchangeKey, text: String) -> Result<(), StoreError> {
        let exchange = self
            .exchanges
            .get_mut(&key)
            .ok_or(StoreError::UnknownExchange(key))?;
        let affordance = submit_affordance(&text, &self.translations);
        exchange.set_draft(text);
        if self.expanded == Some(key) {
            self.view_updates.push(ViewUpdate::SubmitAffordance {
                handle: ViewHandle::detail(key),
                affordance,
            });
        }
        self.mark_dirty();
        Ok(())
    }

    /// Optimistic half of a reply: validate the draft, append it, mark the
    /// exchange pending. The draft is left untouched on validation failure.
    pub fn submit_draft(&mut self, key: ExchangeKey) -> Result<ReplyRequest, StoreError> {
        let exchange = self
            .exchanges
            .get_mut(&key)
            .ok_or(StoreError::UnknownExchange(key))?;
        let text = exchange.draft_message().to_string();
        if let Err(err) = validate_reply(&text) {
            let affordance = SubmitAffordance {
                enabled: false,
                title: self.translations.submit_error_title(&err),
                remaining: remaining_characters(&text),
            };
            self.view_updates.push(ViewUpdate::SubmitAffordance {
                handle: ViewHandle::detail(key),
                affordance,
            });
            self.mark_dirty();
            return Err(err.into());
        }
        exchange.append_draft_response(&text)?;
        let id = exchange.id();
        self.push_responses_changed(key);
        if self.expanded == Some(key) {
            self.view_updates.push(ViewUpdate::SubmitAffordance {
                handle: ViewHandle::detail(key),
                affordance: submit_affordance("", &self.translations),
            });
        }
        self.set_status(key, StatusCode::pending())?;
        Ok(ReplyRequest { id, msg: text })
    }

    /// Confirmed half of a reply: swap in the canonical text, adopt the server status.
    pub fn reconcile_reply(&mut self, key: ExchangeKey, ack: ReplyAck) -> Result<(), StoreError> {
        let exchange = self
            .exchanges
            .get_mut(&key)
            .ok_or(StoreError::UnknownExchange(key))?;
        match exchange.reconcile_latest_pending(ack.sms) {
            Some(index) => exchange_debug!("Reconciled response {} of exchange key={}", index, key),
            None => exchange_debug!("No pending response to reconcile for exchange key={}", key),
        }
        self.push_responses_changed(key);
        self.set_status(key, ack.status)
    }

    pub fn view(&self) -> ListViewModel {
        ListViewModel {
            bound: self.container.is_some(),
            rows: self
                .order
                .iter()
                .filter_map(|key| {
                    self.exchanges
                        .get(key)
                        .map(|exchange| self.summary_row(*key, exchange))
                })
                .collect(),
            max_id: self.max_id,
            expanded: self.expanded,
        }
    }

    pub fn take_view_updates(&mut self) -> Vec<ViewUpdate> {
        std::mem::take(&mut self.view_updates)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn ensure_bound(&self) -> Result<(), StoreError> {
        if self.container.is_none() {
            return Err(StoreError::Unbound);
        }
        Ok(())
    }

    fn expand(&mut self, key: ExchangeKey) {
        let Some(exchange) = self.exchanges.get(&key) else {
            return;
        };
        let detail = DetailView {
            row: self.summary_row(key, exchange),
            responses: exchange.responses().to_vec(),
            draft: exchange.draft_message().to_string(),
            send_label: self.translations.send_message.clone(),
        };
        let affordance = submit_affordance(exchange.draft_message(), &self.translations);
        self.expanded = Some(key);
        self.view_updates.push(ViewUpdate::RenderDetail(detail));
        self.view_updates.push(ViewUpdate::SubmitAffordance {
            handle: ViewHandle::detail(key),
            affordance,
        });
    }

    fn rendered_views(&self, key: ExchangeKey) -> Vec<ViewHandle> {
        let mut handles = vec![ViewHandle::summary(key)];
        if self.expanded == Some(key) {
            handles.push(ViewHandle::detail(key));
        }
        handles
    }

    fn push_responses_changed(&mut self, key: ExchangeKey) {
        let Some(exchange) = self.exchanges.get(&key) else {
            return;
        };
        let summary = exchange.response_count_summary(&self.translations);
        let responses = exchange.responses().to_vec();
        for handle in self.rendered_views(key) {
            self.view_updates.push(ViewUpdate::ResponsesChanged {
                handle,
                summary: summary.clone(),
                responses: responses.clone(),
            });
        }
    }

    fn summary_row(&self, key: ExchangeKey, exchange: &Exchange) -> SummaryRow {
        let status = exchange.current_status_code();
        SummaryRow {
            key,
            id: exchange.id(),
            status_label: self.translations.localized_label(status.as_str()),
            status,
            name: exchange.name().to_string(),
            message: exchange.message().to_string(),
            date_str: exchange.date_str().to_string(),
            response_summary: exchange.response_count_summary(&self.translations),
        }
    }
}

/// Submit control state for a draft: disabled when blank or over the limit.
pub fn submit_affordance(draft: &str, translations: &Translations) -> SubmitAffordance {
    let remaining = remaining_characters(draft);
    let (enabled, title) = match validate_reply(draft) {
        Ok(()) => (true, String::new()),
        Err(err) => (false, translations.submit_error_title(&err)),
    };
    SubmitAffordance {
        enabled,
        title,
        remaining,
    }
}
