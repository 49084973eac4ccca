//! Pulse Test Utilities
//!
//! Centralized test infrastructure for the Pulse workspace:
//! - A scripted mock transport for the query cache
//! - Proptest generators for users, posts, and comments
//! - Test fixtures for common datasets
//! - Recorders that capture subscription callbacks as a stream

pub use pulse_cache::{QueryState, QueryStatus, Transport};
pub use pulse_core::{Address, Comment, Company, FetchError, FetchResult, Post, User};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

#[derive(Debug, Clone)]
enum Route {
    Json(Value),
    Fail(FetchError),
}

/// Scripted in-memory [`Transport`].
///
/// Routes are matched on the exact request path. Unknown paths answer with
/// a 404 `Status` error. Every request is counted, including failures.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Duration,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, so concurrent requests overlap in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Serve `users`, `posts`, `comments`, and the per-user routes from
    /// `dataset`.
    pub fn with_dataset(self, dataset: &fixtures::Dataset) -> Self {
        self.respond("users", &dataset.users);
        self.respond("posts", &dataset.posts);
        self.respond("comments", &dataset.comments);
        for user in &dataset.users {
            self.respond(&format!("users/{}", user.id), user);
            let posts: Vec<&Post> = dataset
                .posts
                .iter()
                .filter(|post| post.user_id == user.id)
                .collect();
            self.respond(&format!("posts?userId={}", user.id), &posts);
        }
        self
    }

    /// Answer `path` with `body` serialized to JSON.
    pub fn respond<T: Serialize + ?Sized>(&self, path: &str, body: &T) {
        let value = serde_json::to_value(body).unwrap_or(Value::Null);
        self.respond_json(path, value);
    }

    pub fn respond_json(&self, path: &str, body: Value) {
        locked(&self.routes).insert(path.to_string(), Route::Json(body));
    }

    /// Answer `path` with `error`.
    pub fn fail(&self, path: &str, error: FetchError) {
        locked(&self.routes).insert(path.to_string(), Route::Fail(error));
    }

    /// Answer `path` with a connection failure.
    pub fn fail_transport(&self, path: &str) {
        self.fail(path, FetchError::transport(path, "connection refused"));
    }

    /// Number of requests made for `path`.
    pub fn calls(&self, path: &str) -> usize {
        locked(&self.calls).get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        locked(&self.calls).values().sum()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, path: &str) -> FetchResult<Value> {
        *locked(&self.calls).entry(path.to_string()).or_insert(0) += 1;
        // Resolve before sleeping: a route swapped mid-flight applies to the
        // next request only.
        let route = locked(&self.routes).get(path).cloned();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match route {
            Some(Route::Json(body)) => Ok(body),
            Some(Route::Fail(error)) => Err(error),
            None => Err(FetchError::Status {
                path: path.to_string(),
                status: 404,
                body: String::new(),
            }),
        }
    }
}

// ============================================================================
// RECORDERS
// ============================================================================

pub mod recorder {
    //! Capture subscription callbacks on a channel.

    use super::*;
    use tokio::sync::mpsc;

    /// Callback that forwards every state it receives to the returned
    /// receiver.
    pub fn recorder<T: Send + Sync + 'static>() -> (
        impl Fn(&QueryState<T>) + Send + Sync + 'static,
        mpsc::UnboundedReceiver<QueryState<T>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = move |state: &QueryState<T>| {
            let _ = tx.send(state.clone());
        };
        (callback, rx)
    }

    /// Next recorded state, or `None` after `timeout`.
    pub async fn next_state<T>(
        rx: &mut mpsc::UnboundedReceiver<QueryState<T>>,
        timeout: Duration,
    ) -> Option<QueryState<T>> {
        tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
    }

    /// Skip ahead to the next state with no fetch in flight that is either
    /// `Success` or `Error`.
    pub async fn next_settled<T>(
        rx: &mut mpsc::UnboundedReceiver<QueryState<T>>,
        timeout: Duration,
    ) -> Option<QueryState<T>> {
        let wait = async {
            while let Some(state) = rx.recv().await {
                if !state.is_fetching && (state.is_success() || state.is_error()) {
                    return Some(state);
                }
            }
            None
        };
        tokio::time::timeout(timeout, wait).await.ok().flatten()
    }

    /// Drain whatever has been recorded so far without waiting.
    pub fn drain<T>(rx: &mut mpsc::UnboundedReceiver<QueryState<T>>) -> Vec<QueryState<T>> {
        let mut states = Vec::new();
        while let Ok(state) = rx.try_recv() {
            states.push(state);
        }
        states
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Pulse entity types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a display name of one to three words.
    pub fn arb_name() -> impl Strategy<Value = String> {
        prop::collection::vec("[A-Z][a-z]{1,8}", 1..=3).prop_map(|parts| parts.join(" "))
    }

    /// Generate a user with the given id.
    pub fn arb_user(id: u64) -> impl Strategy<Value = User> {
        (arb_name(), "[a-z]{3,10}", "[a-z]{3,10}", "[A-Z][a-z]{2,10}").prop_map(
            move |(name, username, company, city)| User {
                id,
                email: format!("{username}@example.com"),
                name,
                username,
                address: Address {
                    street: None,
                    suite: None,
                    city,
                    zipcode: "00000".to_string(),
                },
                company: Company {
                    name: company,
                    catch_phrase: String::new(),
                    bs: None,
                },
                phone: None,
                website: None,
            },
        )
    }

    /// Generate a post with the given id whose author is in `1..=max_user_id`.
    pub fn arb_post(id: u64, max_user_id: u64) -> impl Strategy<Value = Post> {
        (1..=max_user_id.max(1), "[a-z ]{0,40}").prop_map(move |(user_id, title)| Post {
            user_id,
            id,
            title,
            body: String::new(),
        })
    }

    /// Generate a comment with the given id on a post in `1..=max_post_id`.
    pub fn arb_comment(id: u64, max_post_id: u64) -> impl Strategy<Value = Comment> {
        (1..=max_post_id.max(1), "[a-z]{3,10}").prop_map(move |(post_id, who)| Comment {
            post_id,
            id,
            name: format!("comment {id}"),
            email: format!("{who}@example.com"),
            body: String::new(),
        })
    }

    /// Generate a dataset with sequential ids.
    ///
    /// Foreign keys may point one past the last user or post, so joins see
    /// unmatched references.
    pub fn arb_dataset() -> impl Strategy<Value = fixtures::Dataset> {
        (0u64..15, 0u64..40, 0u64..80).prop_flat_map(|(users, posts, comments)| {
            let users_s: Vec<_> = (1..=users).map(arb_user).collect();
            let posts_s: Vec<_> = (1..=posts).map(|id| arb_post(id, users + 1)).collect();
            let comments_s: Vec<_> = (1..=comments)
                .map(|id| arb_comment(id, posts + 1))
                .collect();
            (users_s, posts_s, comments_s).prop_map(|(users, posts, comments)| {
                fixtures::Dataset {
                    users,
                    posts,
                    comments,
                }
            })
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built datasets for common testing scenarios.

    use super::*;

    /// The three analytics collections together.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Dataset {
        pub users: Vec<User>,
        pub posts: Vec<Post>,
        pub comments: Vec<Comment>,
    }

    /// A user with placeholder contact details.
    pub fn user(id: u64, name: &str) -> User {
        let handle = name.split_whitespace().next().unwrap_or(name).to_lowercase();
        User {
            id,
            name: name.to_string(),
            username: handle.clone(),
            email: format!("{handle}@example.com"),
            address: Address {
                street: Some("Main St".to_string()),
                suite: None,
                city: "Gwenborough".to_string(),
                zipcode: "92998-3874".to_string(),
            },
            company: Company {
                name: "Romaguera-Crona".to_string(),
                catch_phrase: "Multi-layered client-server neural-net".to_string(),
                bs: None,
            },
            phone: None,
            website: None,
        }
    }

    pub fn post(id: u64, user_id: u64, title: &str) -> Post {
        Post {
            user_id,
            id,
            title: title.to_string(),
            body: String::new(),
        }
    }

    pub fn comment(id: u64, post_id: u64) -> Comment {
        Comment {
            post_id,
            id,
            name: format!("comment {id}"),
            email: "reader@example.com".to_string(),
            body: String::new(),
        }
    }

    /// Ann and Bo, one post each, one comment on Ann's post.
    pub fn example_dataset() -> Dataset {
        Dataset {
            users: vec![user(1, "Ann"), user(2, "Bo")],
            posts: vec![post(10, 1, "Hi"), post(11, 2, "Yo")],
            comments: vec![comment(100, 10)],
        }
    }

    /// Ten users, fifty posts, and a hundred and fifty comments.
    ///
    /// User `n` writes posts round-robin; every post gets three comments.
    /// Every fifth post title contains "hello".
    pub fn sample_dataset() -> Dataset {
        const NAMES: [&str; 10] = [
            "Leanne Graham",
            "Ervin Howell",
            "Clementine Bauch",
            "Patricia Lebsack",
            "Chelsey Dietrich",
            "Dennis Schulist",
            "Kurtis Weissnat",
            "Nicholas Runolfsdottir",
            "Glenna Reichert",
            "Clementina DuBuque",
        ];

        let users = NAMES
            .iter()
            .zip(1u64..)
            .map(|(name, id)| user(id, name))
            .collect();
        let posts = (1u64..=50)
            .map(|id| {
                let title = if id % 5 == 0 {
                    format!("Hello number {id}")
                } else {
                    format!("post {id}")
                };
                post(id, (id - 1) % 10 + 1, &title)
            })
            .collect();
        let comments = (1u64..=150).map(|id| comment(id, (id - 1) / 3 + 1)).collect();

        Dataset {
            users,
            posts,
            comments,
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over query states.

    use super::*;

    /// Assert the state settled successfully with no fetch in flight.
    pub fn assert_success<T: ?Sized>(state: &QueryState<T>) {
        assert_eq!(state.status, QueryStatus::Success, "state: {state:?}");
        assert!(!state.is_fetching, "still fetching: {state:?}");
        assert!(state.data.is_some());
    }

    /// Assert the state failed with a transport-class error.
    pub fn assert_transport_error<T: ?Sized>(state: &QueryState<T>) {
        assert_eq!(state.status, QueryStatus::Error, "state: {state:?}");
        assert!(state.data.is_none());
        assert!(
            state.error.as_ref().is_some_and(FetchError::is_transport),
            "expected transport error, got {:?}",
            state.error
        );
    }

    /// Assert the state failed decoding the response body.
    pub fn assert_decode_error<T: ?Sized>(state: &QueryState<T>) {
        assert_eq!(state.status, QueryStatus::Error, "state: {state:?}");
        assert!(
            state.error.as_ref().is_some_and(FetchError::is_decode),
            "expected decode error, got {:?}",
            state.error
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_example_dataset_shape() {
        let data = fixtures::example_dataset();
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.posts[0].user_id, 1);
        assert_eq!(data.comments[0].post_id, 10);
    }

    #[test]
    fn test_sample_dataset_shape() {
        let data = fixtures::sample_dataset();
        assert_eq!(data.users.len(), 10);
        assert_eq!(data.posts.len(), 50);
        assert_eq!(data.comments.len(), 150);
        assert_eq!(data.posts.iter().filter(|p| p.title_matches("hello")).count(), 10);
    }

    #[tokio::test]
    async fn test_mock_transport_counts_and_routes() {
        let transport = MockTransport::new().with_dataset(&fixtures::example_dataset());

        let users = transport.get_json("users").await.unwrap();
        assert_eq!(users.as_array().map(Vec::len), Some(2));

        let by_user = transport.get_json("posts?userId=2").await.unwrap();
        assert_eq!(by_user[0]["id"], 11);

        assert_eq!(transport.calls("users"), 1);
        assert_eq!(transport.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_path_is_404() {
        let transport = MockTransport::new();
        let err = transport.get_json("nowhere").await.unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_mock_transport_injected_failure() {
        let transport = MockTransport::new();
        transport.fail_transport("comments");
        let err = transport.get_json("comments").await.unwrap_err();
        assert_eq!(err.path(), "comments");
        assert_eq!(transport.calls("comments"), 1);
    }

    #[tokio::test]
    async fn test_recorder_forwards_states() {
        let (callback, mut rx) = recorder::recorder::<u32>();
        callback(&QueryState::idle());
        let state = recorder::next_state(&mut rx, Duration::from_millis(50)).await;
        assert!(state.is_some_and(|s| s.is_idle()));
        assert!(recorder::drain(&mut rx).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_dataset_ids_are_sequential(data in generators::arb_dataset()) {
            for (user, expected) in data.users.iter().zip(1u64..) {
                prop_assert_eq!(user.id, expected);
            }
            let max_user = data.users.len() as u64 + 1;
            prop_assert!(data.posts.iter().all(|p| p.user_id >= 1 && p.user_id <= max_user));
        }

        #[test]
        fn prop_generated_names_are_nonempty(user in generators::arb_user(1)) {
            prop_assert!(!user.first_name().is_empty());
            prop_assert!(user.email.ends_with("@example.com"));
        }
    }
}
