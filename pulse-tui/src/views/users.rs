//! Users view: list, selected user's details, and their posts.

use crate::state::App;
use crate::widgets::{DetailPanel, StatusIndicator};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(area);

    render_list(f, app, columns[0]);
    render_detail(f, app, columns[1]);
    render_posts(f, app, columns[2]);
}

fn render_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let users = app.users();
    if let Some(placeholder) = StatusIndicator::for_state("Users", "users", &users, &app.theme) {
        placeholder.render(f, area);
        return;
    }

    let users = users.data().map(Vec::as_slice).unwrap_or_default();
    let items: Vec<ListItem> = users
        .iter()
        .map(|user| {
            ListItem::new(Line::from(vec![
                Span::raw(user.name.clone()),
                Span::styled(
                    format!("  @{}", user.username),
                    Style::default().fg(app.theme.text_dim),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = app.users_view.selected {
        state.select(users.iter().position(|u| u.id == selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Users [j/k]")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(state) = app.selected_user() else {
        let hint = Paragraph::new("Select a user with j/k")
            .style(Style::default().fg(app.theme.text_dim))
            .block(Block::default().title("Details").borders(Borders::ALL));
        f.render_widget(hint, area);
        return;
    };
    if let Some(placeholder) = StatusIndicator::for_state("Details", "user", &state, &app.theme) {
        placeholder.render(f, area);
        return;
    }
    let Some(user) = state.data() else {
        return;
    };

    let title = if state.is_fetching {
        "Details (refreshing)"
    } else {
        "Details"
    };
    let location = format!("{}, {}", user.address.city, user.address.zipcode);
    DetailPanel::new(
        title,
        Style::default().fg(app.theme.secondary),
        Style::default().fg(app.theme.border),
    )
    .field("Name", user.name.as_str())
    .field("Username", user.username.as_str())
    .field("Email", user.email.as_str())
    .optional_field("Phone", user.phone.as_deref())
    .optional_field("Website", user.website.as_deref())
    .field("City", location)
    .field("Company", user.company.name.as_str())
    .optional_field("Tagline", Some(user.company.catch_phrase.as_str()))
    .render(f, area);
}

fn render_posts(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(posts) = app.selected_user_posts() else {
        f.render_widget(Block::default().title("Posts").borders(Borders::ALL), area);
        return;
    };
    if let Some(placeholder) = StatusIndicator::for_state("Posts", "posts", &posts, &app.theme) {
        placeholder.render(f, area);
        return;
    }

    let posts = posts.data().map(Vec::as_slice).unwrap_or_default();
    let items: Vec<ListItem> = posts
        .iter()
        .map(|post| ListItem::new(Span::raw(post.title.clone())))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(format!("Posts ({})", posts.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(list, area);
}
