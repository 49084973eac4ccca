//! View rendering dispatch.

pub mod dashboard;
pub mod users;

use crate::keys::InputMode;
use crate::nav::View;
use crate::state::App;
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Dashboard => dashboard::render(f, app, layout[1]),
        View::Users => users::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "PULSE ",
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for view in View::all() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.theme.text)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", view.title()), style));
    }

    let fetching = [
        app.users().is_fetching,
        app.posts().is_fetching,
        app.comments().is_fetching,
    ]
    .iter()
    .filter(|f| **f)
    .count();
    if fetching > 0 {
        spans.push(Span::styled(
            format!("  syncing {fetching}"),
            Style::default().fg(app.theme.info),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = match app.mode {
        InputMode::Search => "type to search • Esc/Enter done • Ctrl-u clear • Tab switch view",
        InputMode::Normal => {
            "r refresh • R invalidate all • / search • j/k select • Tab switch view • q quit"
        }
    };
    let (text, style) = match app.current_notification() {
        Some(note) => (
            note.display(),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(style);
    f.render_widget(footer, area);
}
