use std::io::Write;

use exchange_core::{
    ContainerHandle, DetailView, ExchangeKey, ListViewModel, Placement, RenderBoundary,
    StatusCode, SubmitAffordance, SummaryRow, ViewHandle, ViewKind,
};

/// Prints view updates as plain text lines.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print_list(&mut self, view: &ListViewModel) {
        if !view.bound {
            self.line("(list not attached)".to_string());
            return;
        }
        if view.rows.is_empty() {
            self.line("(no exchanges)".to_string());
            return;
        }
        for row in &view.rows {
            let marker = if view.expanded == Some(row.key) { "-" } else { "+" };
            self.line(format!("{marker} {}", summary_line(row)));
        }
    }

    pub fn notice(&mut self, text: &str) {
        self.line(text.to_string());
    }

    // Terminal write failures are not actionable here.
    fn line(&mut self, text: String) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

fn summary_line(row: &SummaryRow) -> String {
    let mut line = format!("[{}] #{} {}", row.key, row.id, row.status_label);
    if !row.name.is_empty() {
        line.push_str(&format!(" {}", row.name));
    }
    line.push_str(&format!(": {}", row.message));
    if !row.date_str.is_empty() {
        line.push_str(&format!(" ({})", row.date_str));
    }
    line.push_str(&format!(" | {}", row.response_summary));
    line
}

fn view_name(handle: ViewHandle) -> &'static str {
    match handle.kind {
        ViewKind::Summary => "row",
        ViewKind::Detail => "detail",
    }
}

impl<W: Write> RenderBoundary for TerminalRenderer<W> {
    fn place_in(&mut self, container: ContainerHandle) {
        self.line(format!("attached to container {}", container.0));
    }

    fn render_summary(&mut self, placement: Placement, row: &SummaryRow) {
        let tag = match placement {
            Placement::Append => "",
            Placement::Prepend => "new ",
        };
        self.line(format!("{tag}{}", summary_line(row)));
    }

    fn render_detail(&mut self, detail: &DetailView) {
        self.line(format!("> {}", summary_line(&detail.row)));
        for response in &detail.responses {
            self.line(format!(">   {response}"));
        }
        if !detail.draft.is_empty() {
            self.line(format!(">   draft: {}", detail.draft));
        }
        self.line(format!(
            ">   {}: send {} <text>",
            detail.send_label, detail.row.key
        ));
    }

    fn collapse_detail(&mut self, key: ExchangeKey) {
        self.line(format!("[{key}] collapsed"));
    }

    fn set_status_indicator(&mut self, handle: ViewHandle, status: &StatusCode, label: &str) {
        self.line(format!(
            "[{}] {} status {} ({})",
            handle.key,
            view_name(handle),
            label,
            status
        ));
    }

    fn set_submit_affordance(&mut self, handle: ViewHandle, affordance: &SubmitAffordance) {
        if affordance.enabled {
            self.line(format!(
                "[{}] {} characters left",
                handle.key, affordance.remaining
            ));
        } else {
            self.line(format!("[{}] cannot send: {}", handle.key, affordance.title));
        }
    }

    fn update_responses(&mut self, handle: ViewHandle, summary: &str, responses: &[String]) {
        self.line(format!(
            "[{}] {} {}",
            handle.key,
            view_name(handle),
            summary
        ));
        if handle.kind == ViewKind::Detail {
            if let Some(last) = responses.last() {
                self.line(format!(">   {last}"));
            }
        }
    }
}
