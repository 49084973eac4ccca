//! Application state and action handling.
//!
//! `App` owns the cache subscriptions that keep each dashboard region live.
//! Rendering reads straight from the cache; subscriptions exist to keep
//! entries fetched and to wake the event loop when they change.

use pulse_cache::{
    tags, Endpoint, GetComments, GetPosts, GetPostsByUser, GetUser, GetUsers, QueryCache, QueryKey,
    QueryState, SearchPosts, Subscription,
};
use pulse_core::{
    compute_metrics, recent_activity, ActivityItem, Comment, DashboardMetrics, MetricCards, Post,
    User, UserId, RECENT_ACTIVITY_LIMIT,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::TuiConfig;
use crate::events::TuiEvent;
use crate::keys::{Action, InputMode};
use crate::nav::View;
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::search::{SearchBox, SearchChange};
use crate::theme::PulseTheme;

/// How long non-error notifications stay in the footer.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Subscriptions {
    users: Option<Subscription>,
    posts: Option<Subscription>,
    comments: Option<Subscription>,
    search: Option<Subscription>,
    user_detail: Option<Subscription>,
    user_posts: Option<Subscription>,
}

#[derive(Debug, Clone, Default)]
pub struct UsersViewState {
    pub selected: Option<UserId>,
    pub last_polled: Option<Instant>,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: PulseTheme,
    pub cache: QueryCache,
    pub active_view: View,
    pub mode: InputMode,
    pub search: SearchBox,
    pub users_view: UsersViewState,
    pub notifications: Vec<Notification>,
    events: mpsc::Sender<TuiEvent>,
    subscriptions: Subscriptions,
}

impl App {
    pub fn new(config: TuiConfig, cache: QueryCache, events: mpsc::Sender<TuiEvent>) -> Self {
        let theme = PulseTheme::by_name(&config.theme.name).unwrap_or_default();
        let search = SearchBox::new(config.search.min_chars, config.search_debounce());
        Self {
            config,
            theme,
            cache,
            active_view: View::Dashboard,
            mode: InputMode::Normal,
            search,
            users_view: UsersViewState::default(),
            notifications: Vec::new(),
            events,
            subscriptions: Subscriptions::default(),
        }
    }

    /// Subscribe the dashboard's base collections.
    pub fn start(&mut self) {
        self.subscriptions.users = Some(self.watch::<GetUsers>(()));
        self.subscriptions.posts = Some(self.watch::<GetPosts>(()));
        self.subscriptions.comments = Some(self.watch::<GetComments>(()));
    }

    /// Subscribe to `E(arg)`, forwarding each change to the event loop.
    fn watch<E: Endpoint>(&self, arg: E::Arg) -> Subscription {
        let key = QueryKey::of::<E>(&arg);
        let sender = self.events.clone();
        self.cache.subscribe::<E, _>(arg, move |_state| {
            // A full channel already has a redraw queued.
            let _ = sender.try_send(TuiEvent::QueryUpdated(key.clone()));
        })
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    /// Most recent notification still worth showing.
    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    // ------------------------------------------------------------------------
    // Data accessors
    // ------------------------------------------------------------------------

    pub fn users(&self) -> QueryState<Vec<User>> {
        self.cache.state::<GetUsers>(&())
    }

    pub fn posts(&self) -> QueryState<Vec<Post>> {
        self.cache.state::<GetPosts>(&())
    }

    pub fn comments(&self) -> QueryState<Vec<Comment>> {
        self.cache.state::<GetComments>(&())
    }

    /// Results for the active search term; `None` when the gate is closed.
    pub fn search_results(&self) -> Option<QueryState<Vec<Post>>> {
        self.search
            .active_term()
            .map(|term| self.cache.state::<SearchPosts>(&term.to_string()))
    }

    pub fn selected_user(&self) -> Option<QueryState<User>> {
        self.users_view
            .selected
            .map(|id| self.cache.state::<GetUser>(&id))
    }

    pub fn selected_user_posts(&self) -> Option<QueryState<Vec<Post>>> {
        self.users_view
            .selected
            .map(|id| self.cache.state::<GetPostsByUser>(&id))
    }

    pub fn metrics(&self) -> Option<DashboardMetrics> {
        let (users, posts, comments) = (self.users(), self.posts(), self.comments());
        compute_metrics(
            users.data().map(Vec::as_slice),
            posts.data().map(Vec::as_slice),
            comments.data().map(Vec::as_slice),
        )
    }

    pub fn metric_cards(&self) -> MetricCards {
        let (users, posts, comments) = (self.users(), self.posts(), self.comments());
        MetricCards::from_partial(
            users.data().map(Vec::as_slice),
            posts.data().map(Vec::as_slice),
            comments.data().map(Vec::as_slice),
        )
    }

    pub fn recent_activity(&self) -> Option<Vec<ActivityItem>> {
        let (users, posts, comments) = (self.users(), self.posts(), self.comments());
        posts.data().map(|posts| {
            recent_activity(
                users.data().map(Vec::as_slice),
                posts,
                comments.data().map(Vec::as_slice),
                RECENT_ACTIVITY_LIMIT,
            )
        })
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Apply one event. Returns `true` when the app should exit.
    pub fn handle_event(&mut self, event: TuiEvent, now: Instant) -> bool {
        match event {
            TuiEvent::Input(key) => {
                if let Some(action) = crate::keys::map_key(key, self.mode) {
                    return self.handle_action(action, now);
                }
            }
            TuiEvent::QueryUpdated(key) => self.on_query_updated(&key),
            TuiEvent::Tick => self.on_tick(now),
            TuiEvent::Resize { .. } => {}
        }
        false
    }

    /// Apply one action. Returns `true` when the app should exit.
    pub fn handle_action(&mut self, action: Action, now: Instant) -> bool {
        match action {
            Action::Quit => return true,
            Action::NextView => self.switch_view(self.active_view.next()),
            Action::PrevView => self.switch_view(self.active_view.previous()),
            Action::MoveDown => self.select_next(),
            Action::MoveUp => self.select_previous(),
            Action::Refresh => self.refresh(),
            Action::InvalidateAll => self.invalidate_all(),
            Action::FocusSearch => {
                self.active_view = View::Dashboard;
                self.mode = InputMode::Search;
            }
            Action::SearchInput(c) => self.search.push(c, now),
            Action::SearchBackspace => self.search.backspace(now),
            Action::ClearSearch => self.search.clear(now),
            Action::Cancel => self.mode = InputMode::Normal,
        }
        false
    }

    /// Change view. Search focus does not follow to other views.
    pub fn switch_view(&mut self, view: View) {
        self.active_view = view;
        self.mode = InputMode::Normal;
    }

    pub fn on_tick(&mut self, now: Instant) {
        match self.search.poll(now) {
            Some(SearchChange::Subscribe(term)) => {
                tracing::debug!(term = %term, "Search term settled");
                self.subscriptions.search = Some(self.watch::<SearchPosts>(term));
            }
            Some(SearchChange::Clear) => self.subscriptions.search = None,
            None => {}
        }

        if let Some(id) = self.users_view.selected {
            let due = self
                .users_view
                .last_polled
                .map_or(true, |at| now.saturating_duration_since(at) >= self.config.user_poll_interval());
            if due {
                if self.users_view.last_polled.is_some() {
                    self.cache.refetch_key(&QueryKey::of::<GetUser>(&id));
                }
                self.users_view.last_polled = Some(now);
            }
        }

        self.notifications
            .retain(|note| !note.is_expired(now, NOTIFICATION_TTL));
    }

    /// Surface refresh failures of the base collections in the footer.
    pub fn on_query_updated(&mut self, key: &QueryKey) {
        let endpoint = key.endpoint();
        let failure = if endpoint == GetUsers::NAME {
            self.users().error.map(|e| ("users", e))
        } else if endpoint == GetPosts::NAME {
            self.posts().error.map(|e| ("posts", e))
        } else if endpoint == GetComments::NAME {
            self.comments().error.map(|e| ("comments", e))
        } else {
            None
        };
        if let Some((what, error)) = failure {
            let message = format!("Failed to load {what}: {error}");
            if self
                .notifications
                .last()
                .is_some_and(|last| last.message == message)
            {
                return;
            }
            self.notifications.push(
                Notification::new(NotificationLevel::Error, message)
                    .with_action(NotificationAction::Retry),
            );
        }
    }

    /// Refetch users and posts, keeping current data on screen. Comments
    /// are refetched only when their last load failed.
    pub fn refresh(&mut self) {
        let users = self.cache.refetch_key(&QueryKey::of::<GetUsers>(&()));
        let posts = self.cache.refetch_key(&QueryKey::of::<GetPosts>(&()));
        let comments = self.comments().is_error()
            && self.cache.refetch_key(&QueryKey::of::<GetComments>(&()));
        tracing::info!(users, posts, comments, "Manual refresh");
        let message = if comments {
            "Refreshing users, posts, and comments"
        } else {
            "Refreshing users and posts"
        };
        self.notify(NotificationLevel::Info, message);
    }

    pub fn invalidate_all(&mut self) {
        let triggered: usize = tags::ALL.iter().map(|tag| self.cache.invalidate(*tag)).sum();
        tracing::info!(triggered, "Invalidated all tags");
        self.notify(
            NotificationLevel::Info,
            format!("Invalidated cache, {triggered} queries refetching"),
        );
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.active_view != View::Users {
            return;
        }
        let users = self.users();
        let ids: Vec<UserId> = users.data().map(|u| u.iter().map(|u| u.id).collect()).unwrap_or_default();
        let next = select_next_id(&ids, self.users_view.selected);
        self.select_user(next);
    }

    pub fn select_previous(&mut self) {
        if self.active_view != View::Users {
            return;
        }
        let users = self.users();
        let ids: Vec<UserId> = users.data().map(|u| u.iter().map(|u| u.id).collect()).unwrap_or_default();
        let prev = select_prev_id(&ids, self.users_view.selected);
        self.select_user(prev);
    }

    /// Point the user detail panels at `id`, replacing their subscriptions.
    pub fn select_user(&mut self, id: Option<UserId>) {
        if id == self.users_view.selected {
            return;
        }
        self.users_view.selected = id;
        self.users_view.last_polled = None;
        self.subscriptions.user_detail = id.map(|id| self.watch::<GetUser>(id));
        self.subscriptions.user_posts = id.map(|id| self.watch::<GetPostsByUser>(id));
    }

    /// Key of the live search subscription, if any.
    pub fn search_subscription(&self) -> Option<&QueryKey> {
        self.subscriptions.search.as_ref().map(Subscription::key)
    }
}

fn select_next_id(ids: &[UserId], selected: Option<UserId>) -> Option<UserId> {
    if ids.is_empty() {
        return None;
    }
    let next = match selected.and_then(|id| ids.iter().position(|i| *i == id)) {
        Some(index) => (index + 1) % ids.len(),
        None => 0,
    };
    Some(ids[next])
}

fn select_prev_id(ids: &[UserId], selected: Option<UserId>) -> Option<UserId> {
    if ids.is_empty() {
        return None;
    }
    let index = selected
        .and_then(|id| ids.iter().position(|i| *i == id))
        .unwrap_or(0);
    let prev = if index == 0 { ids.len() - 1 } else { index - 1 };
    Some(ids[prev])
}
