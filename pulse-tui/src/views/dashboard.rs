//! Dashboard view: headline cards, charts, search, and recent activity.

use crate::keys::InputMode;
use crate::state::App;
use crate::widgets::{CardValue, MetricCard, ShareGauges, StatusIndicator};
use pulse_core::DashboardMetrics;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(50),
            Constraint::Min(0),
        ])
        .split(area);

    render_cards(f, app, rows[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);
    let metrics = app.metrics();
    render_contributors(f, app, metrics.as_ref(), charts[0]);
    render_activity_chart(f, app, metrics.as_ref(), charts[1]);

    let data = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_search(f, app, data[0]);
    render_recent_activity(f, app, data[1]);
}

fn render_cards(f: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let cards = app.metric_cards();
    let (users, posts, comments) = (app.users(), app.posts(), app.comments());
    let values = [
        ("Users", CardValue::for_state(&users, cards.users.map(|n| n.to_string()))),
        ("Posts", CardValue::for_state(&posts, cards.posts.map(|n| n.to_string()))),
        (
            "Comments",
            CardValue::for_state(&comments, cards.comments.map(|n| n.to_string())),
        ),
        (
            "Avg engagement",
            CardValue::from_parts(
                posts.is_error() || comments.is_error(),
                cards.average_engagement.map(|v| format!("{v:.1}")),
            ),
        ),
    ];

    for ((title, value), column) in values.into_iter().zip(columns.iter()) {
        MetricCard {
            title,
            value,
            theme: &app.theme,
        }
        .render(f, *column);
    }
}

/// Placeholder for whichever base collection is holding the charts back.
fn pending_placeholder(app: &App, title: &str) -> Option<StatusIndicator> {
    StatusIndicator::for_state(title, "users", &app.users(), &app.theme)
        .or_else(|| StatusIndicator::for_state(title, "posts", &app.posts(), &app.theme))
        .or_else(|| StatusIndicator::for_state(title, "comments", &app.comments(), &app.theme))
}

fn render_contributors(
    f: &mut Frame<'_>,
    app: &App,
    metrics: Option<&DashboardMetrics>,
    area: Rect,
) {
    let title = "Top contributors";
    match metrics {
        Some(metrics) => ShareGauges {
            title,
            shares: &metrics.contributors,
            theme: &app.theme,
        }
        .render(f, area),
        None => {
            if let Some(placeholder) = pending_placeholder(app, title) {
                placeholder.render(f, area);
            }
        }
    }
}

fn render_activity_chart(
    f: &mut Frame<'_>,
    app: &App,
    metrics: Option<&DashboardMetrics>,
    area: Rect,
) {
    let title = "Posts and comments per user";
    let Some(metrics) = metrics else {
        if let Some(placeholder) = pending_placeholder(app, title) {
            placeholder.render(f, area);
        }
        return;
    };

    let posts_style = Style::default().fg(app.theme.series_color(0));
    let comments_style = Style::default().fg(app.theme.series_color(1));

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title(Line::from(vec![
                    Span::raw(format!("{title} ")),
                    Span::styled("■ posts ", posts_style),
                    Span::styled("■ comments", comments_style),
                ]))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .bar_width(3)
        .bar_gap(0)
        .group_gap(2);

    for activity in &metrics.per_user {
        let group = BarGroup::default().label(Line::from(activity.name.clone())).bars(&[
            Bar::default()
                .value(activity.posts as u64)
                .style(posts_style),
            Bar::default()
                .value(activity.comments as u64)
                .style(comments_style),
        ]);
        chart = chart.data(group);
    }

    f.render_widget(chart, area);
}

fn render_search(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let focused = app.mode == InputMode::Search;
    let border = if focused {
        app.theme.border_focus
    } else {
        app.theme.border
    };
    let input = Paragraph::new(app.search.input().to_string()).block(
        Block::default()
            .title("Search posts [/]")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, chunks[0]);
    if focused {
        f.set_cursor(cursor_column(chunks[0], app.search.input()), chunks[0].y + 1);
    }

    let results_block = Block::default()
        .title("Results")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    if app.search.is_too_short() {
        let hint = Paragraph::new(format!(
            "Type at least {} characters",
            app.search.min_chars()
        ))
        .style(Style::default().fg(app.theme.text_dim))
        .block(results_block);
        f.render_widget(hint, chunks[1]);
        return;
    }

    let Some(results) = app.search_results() else {
        f.render_widget(results_block, chunks[1]);
        return;
    };
    if let Some(placeholder) = StatusIndicator::for_state("Results", "results", &results, &app.theme)
    {
        placeholder.render(f, chunks[1]);
        return;
    }

    let posts = results.data().map(Vec::as_slice).unwrap_or_default();
    let items: Vec<ListItem> = if posts.is_empty() {
        vec![ListItem::new(Span::styled(
            "No matching posts",
            Style::default().fg(app.theme.text_dim),
        ))]
    } else {
        posts
            .iter()
            .map(|post| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("#{:<4}", post.id), Style::default().fg(app.theme.text_dim)),
                    Span::raw(post.title.clone()),
                ]))
            })
            .collect()
    };
    f.render_widget(List::new(items).block(results_block), chunks[1]);
}

/// Column just past the typed text, clamped inside the input border.
fn cursor_column(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

fn render_recent_activity(f: &mut Frame<'_>, app: &App, area: Rect) {
    let title = "Recent activity";
    let posts = app.posts();
    if let Some(placeholder) = StatusIndicator::for_state(title, "posts", &posts, &app.theme) {
        placeholder.render(f, area);
        return;
    }

    let comments_failed = app.comments().is_error();
    let items: Vec<ListItem> = app
        .recent_activity()
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            let comments = if comments_failed {
                "comments unavailable".to_string()
            } else {
                format!("{} comments", item.author_comments)
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    item.title,
                    Style::default()
                        .fg(app.theme.text)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {} · {}", item.author, comments),
                    Style::default().fg(app.theme.text_dim),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(list, area);
}
