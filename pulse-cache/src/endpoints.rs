//! Analytics endpoints served by the upstream REST source.
//!
//! Each endpoint is a zero-sized marker type implementing [`Endpoint`].

use pulse_core::{Comment, FetchResult, Post, User, UserId};
use serde_json::Value;

use crate::cache::{decode_json, Endpoint, Tag};

/// Invalidation tags for the analytics resources.
pub mod tags {
    use crate::cache::Tag;

    pub const USERS: Tag = Tag::new("Users");
    pub const POSTS: Tag = Tag::new("Posts");
    pub const COMMENTS: Tag = Tag::new("Comments");

    pub const ALL: [Tag; 3] = [USERS, POSTS, COMMENTS];
}

/// Maximum number of posts returned by [`SearchPosts`].
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// First [`SEARCH_RESULT_LIMIT`] posts whose title contains `term`,
/// ignoring case, in input order.
pub fn filter_posts(posts: Vec<Post>, term: &str) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| post.title_matches(term))
        .take(SEARCH_RESULT_LIMIT)
        .collect()
}

/// All users.
#[derive(Debug, Clone, Copy)]
pub struct GetUsers;

impl Endpoint for GetUsers {
    const NAME: &'static str = "getUsers";
    type Arg = ();
    type Output = Vec<User>;

    fn path(_arg: &()) -> String {
        "users".to_string()
    }

    fn tags(_arg: &()) -> Vec<Tag> {
        vec![tags::USERS]
    }

    fn decode(raw: Value, _arg: &(), path: &str) -> FetchResult<Vec<User>> {
        decode_json(raw, path)
    }
}

/// All posts.
#[derive(Debug, Clone, Copy)]
pub struct GetPosts;

impl Endpoint for GetPosts {
    const NAME: &'static str = "getPosts";
    type Arg = ();
    type Output = Vec<Post>;

    fn path(_arg: &()) -> String {
        "posts".to_string()
    }

    fn tags(_arg: &()) -> Vec<Tag> {
        vec![tags::POSTS]
    }

    fn decode(raw: Value, _arg: &(), path: &str) -> FetchResult<Vec<Post>> {
        decode_json(raw, path)
    }
}

/// All comments.
#[derive(Debug, Clone, Copy)]
pub struct GetComments;

impl Endpoint for GetComments {
    const NAME: &'static str = "getComments";
    type Arg = ();
    type Output = Vec<Comment>;

    fn path(_arg: &()) -> String {
        "comments".to_string()
    }

    fn tags(_arg: &()) -> Vec<Tag> {
        vec![tags::COMMENTS]
    }

    fn decode(raw: Value, _arg: &(), path: &str) -> FetchResult<Vec<Comment>> {
        decode_json(raw, path)
    }
}

/// Title search over the full posts collection.
///
/// Fetches `posts` and filters client-side; each distinct term is its own
/// cache entry. Carries no tag, so invalidating `Posts` leaves search
/// results alone. Callers gate short terms themselves.
#[derive(Debug, Clone, Copy)]
pub struct SearchPosts;

impl Endpoint for SearchPosts {
    const NAME: &'static str = "searchPosts";
    type Arg = String;
    type Output = Vec<Post>;

    fn path(_term: &String) -> String {
        "posts".to_string()
    }

    fn decode(raw: Value, term: &String, path: &str) -> FetchResult<Vec<Post>> {
        let posts: Vec<Post> = decode_json(raw, path)?;
        Ok(filter_posts(posts, term))
    }
}

/// A single user by id.
#[derive(Debug, Clone, Copy)]
pub struct GetUser;

impl Endpoint for GetUser {
    const NAME: &'static str = "getUser";
    type Arg = UserId;
    type Output = User;

    fn path(id: &UserId) -> String {
        format!("users/{id}")
    }

    fn tags(_id: &UserId) -> Vec<Tag> {
        vec![tags::USERS]
    }

    fn decode(raw: Value, _id: &UserId, path: &str) -> FetchResult<User> {
        decode_json(raw, path)
    }
}

/// Posts written by one user.
#[derive(Debug, Clone, Copy)]
pub struct GetPostsByUser;

impl Endpoint for GetPostsByUser {
    const NAME: &'static str = "getPostsByUser";
    type Arg = UserId;
    type Output = Vec<Post>;

    fn path(id: &UserId) -> String {
        format!("posts?userId={id}")
    }

    fn tags(_id: &UserId) -> Vec<Tag> {
        vec![tags::POSTS]
    }

    fn decode(raw: Value, _id: &UserId, path: &str) -> FetchResult<Vec<Post>> {
        decode_json(raw, path)
    }
}
