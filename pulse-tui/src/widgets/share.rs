//! Contributor share gauges.

use pulse_core::ContributorShare;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::theme::PulseTheme;

/// One proportional bar per contributor, colored by position.
pub struct ShareGauges<'a> {
    pub title: &'a str,
    pub shares: &'a [ContributorShare],
    pub theme: &'a PulseTheme,
}

impl ShareGauges<'_> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.shares.is_empty() {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.shares
                    .iter()
                    .map(|_| Constraint::Length(1))
                    .chain(std::iter::once(Constraint::Min(0))),
            )
            .split(inner);

        for (index, share) in self.shares.iter().enumerate() {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(self.theme.series_color(index)))
                .ratio(share.share.clamp(0.0, 1.0))
                .label(format!("{} {:.1}% ({})", share.name, share.percent(), share.posts));
            f.render_widget(gauge, rows[index]);
        }
    }
}
