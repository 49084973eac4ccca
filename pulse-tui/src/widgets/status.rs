//! Per-region loading and error placeholder.
//!
//! Each data region renders one of these in place of its content until the
//! query behind it has data, so a failure in one region never blanks another.

use pulse_cache::{QueryState, QueryStatus};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::theme::{query_status_color, PulseTheme};

pub struct StatusIndicator {
    pub title: String,
    pub status: String,
    pub style: Style,
}

impl StatusIndicator {
    /// Placeholder for `state`, or `None` when there is data to show.
    pub fn for_state<T: ?Sized>(
        title: impl Into<String>,
        what: &str,
        state: &QueryState<T>,
        theme: &PulseTheme,
    ) -> Option<Self> {
        let status = match state.status {
            QueryStatus::Success if state.data.is_some() => return None,
            QueryStatus::Error => match &state.error {
                Some(err) => format!("Failed to load {what}: {err}"),
                None => format!("Failed to load {what}"),
            },
            QueryStatus::Idle => format!("Waiting for {what}"),
            QueryStatus::Loading | QueryStatus::Success => format!("Loading {what}..."),
        };
        Some(Self {
            title: title.into(),
            status,
            style: Style::default().fg(query_status_color(state.status, theme)),
        })
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.status.clone())
            .style(self.style)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            );
        f.render_widget(paragraph, area);
    }
}
