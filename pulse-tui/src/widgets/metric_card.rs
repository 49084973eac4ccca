//! Headline number card.

use pulse_cache::QueryState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::PulseTheme;

/// What a card shows while its inputs resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Loading,
    Error,
    Ready(String),
}

impl CardValue {
    /// `failed` wins over a stale value so errors are never hidden.
    pub fn from_parts(failed: bool, value: Option<String>) -> Self {
        match (failed, value) {
            (true, _) => CardValue::Error,
            (false, Some(value)) => CardValue::Ready(value),
            (false, None) => CardValue::Loading,
        }
    }

    pub fn for_state<T: ?Sized>(state: &QueryState<T>, value: Option<String>) -> Self {
        Self::from_parts(state.is_error(), value)
    }

    pub fn text(&self) -> &str {
        match self {
            CardValue::Loading => "...",
            CardValue::Error => "ERR",
            CardValue::Ready(value) => value,
        }
    }
}

pub struct MetricCard<'a> {
    pub title: &'a str,
    pub value: CardValue,
    pub theme: &'a PulseTheme,
}

impl MetricCard<'_> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let color = match self.value {
            CardValue::Loading => self.theme.text_dim,
            CardValue::Error => self.theme.error,
            CardValue::Ready(_) => self.theme.primary,
        };
        let value = Line::from(Span::styled(
            self.value.text().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        let card = Paragraph::new(value).alignment(Alignment::Center).block(
            Block::default()
                .title(self.title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.border)),
        );
        f.render_widget(card, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_text() {
        assert_eq!(CardValue::from_parts(false, None).text(), "...");
        assert_eq!(CardValue::from_parts(true, Some("3".into())).text(), "ERR");
        assert_eq!(CardValue::from_parts(false, Some("3".into())).text(), "3");
    }
}
