use httpmock::MockServer;
use pulse_cache::{GetPostsByUser, GetUsers, QueryCache, SearchPosts};
use pulse_core::{FetchError, User};
use pulse_test_utils::fixtures;
use pulse_cache::Transport;
use pulse_tui::api_client::RestClient;
use std::sync::Arc;
use std::time::Duration;

fn client(server: &MockServer) -> RestClient {
    RestClient::with_timeout(&server.base_url(), Duration::from_secs(2)).expect("client")
}

#[tokio::test]
async fn get_json_returns_body() {
    let server = MockServer::start_async().await;
    let users = vec![fixtures::user(1, "Ann Smith")];
    let body = serde_json::to_string(&users).expect("encode");
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/users");
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
        .await;

    let value = client(&server).get_json("users").await.expect("fetch");
    let decoded: Vec<User> = serde_json::from_value(value).expect("decode");
    assert_eq!(decoded, users);
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/posts");
            then.status(500).body("boom");
        })
        .await;

    let err = client(&server).get_json("posts").await.unwrap_err();
    match &err {
        FetchError::Status { path, status, body } => {
            assert_eq!(path, "posts");
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(err.is_transport());
}

#[tokio::test]
async fn malformed_json_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/comments");
            then.status(200)
                .header("content-type", "application/json")
                .body("[{\"id\": ");
        })
        .await;

    let err = client(&server).get_json("comments").await.unwrap_err();
    assert!(err.is_decode());
    assert_eq!(err.path(), "comments");
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let client = RestClient::with_timeout("http://127.0.0.1:9/", Duration::from_millis(500))
        .expect("client");
    let err = client.get_json("users").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}

#[tokio::test]
async fn posts_by_user_sends_query_param() {
    let server = MockServer::start_async().await;
    let posts = vec![fixtures::post(10, 7, "Hi")];
    let body = serde_json::to_string(&posts).expect("encode");
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/posts").query_param("userId", "7");
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
        .await;

    let cache = QueryCache::with_defaults(Arc::new(client(&server)));
    let state = cache.query::<GetPostsByUser>(&7).await;
    assert_eq!(state.data().map(Vec::len), Some(1));
    mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_queries_share_one_request() {
    let server = MockServer::start_async().await;
    let users = fixtures::example_dataset().users;
    let body = serde_json::to_string(&users).expect("encode");
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/users");
            then.status(200)
                .delay(Duration::from_millis(50))
                .header("content-type", "application/json")
                .body(body);
        })
        .await;

    let cache = QueryCache::with_defaults(Arc::new(client(&server)));
    let (a, b, c) = tokio::join!(
        cache.query::<GetUsers>(&()),
        cache.query::<GetUsers>(&()),
        cache.query::<GetUsers>(&()),
    );
    assert!(a.is_success() && b.is_success() && c.is_success());
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn search_filters_full_collection() {
    let server = MockServer::start_async().await;
    let dataset = fixtures::sample_dataset();
    let body = serde_json::to_string(&dataset.posts).expect("encode");
    server
        .mock_async(|when, then| {
            when.method("GET").path("/posts");
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
        .await;

    let cache = QueryCache::with_defaults(Arc::new(client(&server)));
    let state = cache.query::<SearchPosts>(&"HELLO".to_string()).await;
    let results = state.data().expect("results");
    assert_eq!(results.len(), 5);
    assert!(results
        .iter()
        .all(|post| post.title.to_lowercase().contains("hello")));
}
