use crate::{ContainerHandle, ExchangeId, ExchangeKey, Placement, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// The one-line row shown in the list.
    Summary,
    /// The expanded row with responses and the reply form.
    Detail,
}

/// Opaque reference to one rendered view of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle {
    pub key: ExchangeKey,
    pub kind: ViewKind,
}

impl ViewHandle {
    pub fn summary(key: ExchangeKey) -> Self {
        Self {
            key,
            kind: ViewKind::Summary,
        }
    }

    pub fn detail(key: ExchangeKey) -> Self {
        Self {
            key,
            kind: ViewKind::Detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub key: ExchangeKey,
    pub id: ExchangeId,
    pub status: StatusCode,
    pub status_label: String,
    pub name: String,
    pub message: String,
    pub date_str: String,
    pub response_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub row: SummaryRow,
    pub responses: Vec<String>,
    pub draft: String,
    pub send_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAffordance {
    pub enabled: bool,
    /// Why the control is disabled; empty when enabled.
    pub title: String,
    pub remaining: i64,
}

/// A change the render boundary must reflect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    PlaceIn(ContainerHandle),
    RenderSummary {
        placement: Placement,
        row: SummaryRow,
    },
    RenderDetail(DetailView),
    CollapseDetail {
        key: ExchangeKey,
    },
    StatusIndicator {
        handle: ViewHandle,
        status: StatusCode,
        label: String,
    },
    SubmitAffordance {
        handle: ViewHandle,
        affordance: SubmitAffordance,
    },
    ResponsesChanged {
        handle: ViewHandle,
        summary: String,
        responses: Vec<String>,
    },
}

/// Snapshot of the whole list, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListViewModel {
    pub bound: bool,
    pub rows: Vec<SummaryRow>,
    pub max_id: ExchangeId,
    pub expanded: Option<ExchangeKey>,
}

/// Visual layer driven by the store's view updates.
pub trait RenderBoundary {
    fn place_in(&mut self, container: ContainerHandle);
    fn render_summary(&mut self, placement: Placement, row: &SummaryRow);
    fn render_detail(&mut self, detail: &DetailView);
    fn collapse_detail(&mut self, key: ExchangeKey);
    fn set_status_indicator(&mut self, handle: ViewHandle, status: &StatusCode, label: &str);
    fn set_submit_affordance(&mut self, handle: ViewHandle, affordance: &SubmitAffordance);
    fn update_responses(&mut self, handle: ViewHandle, summary: &str, responses: &[String]);
}

/// Replays queued view updates, in order, onto a render boundary.
pub fn apply_view_updates(updates: Vec<ViewUpdate>, boundary: &mut dyn RenderBoundary) {
    for update in updates {
        match update {
            ViewUpdate::PlaceIn(container) => boundary.place_in(container),
            ViewUpdate::RenderSummary { placement, row } => {
                boundary.render_summary(placement, &row)
            }
            ViewUpdate::RenderDetail(detail) => boundary.render_detail(&detail),
            ViewUpdate::CollapseDetail { key } => boundary.collapse_detail(key),
            ViewUpdate::StatusIndicator {
                handle,
                status,
                label,
            } => boundary.set_status_indicator(handle, &status, &label),
            ViewUpdate::SubmitAffordance { handle, affordance } => {
                boundary.set_submit_affordance(handle, &affordance)
            }
            ViewUpdate::ResponsesChanged {
                handle,
                summary,
                responses,
            } => boundary.update_responses(handle, &summary, &responses),
        }
    }
}
