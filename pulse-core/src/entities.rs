//! Core entity structures
//!
//! Shapes of the upstream REST resources. The upstream source is
//! authoritative; these are read-only on the client.

use crate::{CommentId, PostId, UserId};
use serde::{Deserialize, Serialize};

/// A registered author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: Address,
    pub company: Company,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl User {
    /// Short label used on charts: the first whitespace-separated token of the name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Postal address of a user. Only city and zipcode are guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub suite: Option<String>,
    pub city: String,
    pub zipcode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Company tagline.
    #[serde(rename = "catchPhrase", default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: Option<String>,
}

/// A post authored by a user. `user_id` is not required to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Post {
    /// Case-insensitive substring match on the title.
    pub fn title_matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(&term.to_lowercase())
    }
}

/// A comment left on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "postId")]
    pub post_id: PostId,
    pub id: CommentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_decodes_upstream_shape() {
        let raw = serde_json::json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        });

        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.first_name(), "Leanne");
        assert_eq!(user.address.city, "Gwenborough");
        assert_eq!(user.company.catch_phrase, "Multi-layered client-server neural-net");
        assert_eq!(user.website.as_deref(), Some("hildegard.org"));
    }

    #[test]
    fn test_user_website_is_optional() {
        let raw = serde_json::json!({
            "id": 2,
            "name": "Bo",
            "username": "bo",
            "email": "bo@example.com",
            "address": { "city": "Oslo", "zipcode": "0150" },
            "company": { "name": "Acme" }
        });

        let user: User = serde_json::from_value(raw).unwrap();
        assert!(user.website.is_none());
        assert_eq!(user.company.catch_phrase, "");
    }

    #[test]
    fn test_post_and_comment_use_camel_case_foreign_keys() {
        let post: Post =
            serde_json::from_str(r#"{"userId":3,"id":10,"title":"Hi","body":"b"}"#).unwrap();
        assert_eq!(post.user_id, 3);

        let comment: Comment =
            serde_json::from_str(r#"{"postId":10,"id":100,"name":"n","email":"e","body":"b"}"#)
                .unwrap();
        assert_eq!(comment.post_id, 10);
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let post = Post {
            user_id: 1,
            id: 1,
            title: "Hello World".to_string(),
            body: String::new(),
        };
        assert!(post.title_matches("hello"));
        assert!(post.title_matches("WORLD"));
        assert!(!post.title_matches("bye"));
    }

    #[test]
    fn test_first_name_of_single_word_name() {
        let user = User {
            id: 1,
            name: "Ann".to_string(),
            username: "ann".to_string(),
            email: "ann@example.com".to_string(),
            address: Address {
                street: None,
                suite: None,
                city: "X".to_string(),
                zipcode: "1".to_string(),
            },
            company: Company {
                name: "C".to_string(),
                catch_phrase: String::new(),
                bs: None,
            },
            phone: None,
            website: None,
        };
        assert_eq!(user.first_name(), "Ann");
    }
}
