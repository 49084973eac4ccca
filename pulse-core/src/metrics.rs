//! Derived dashboard metrics.
//!
//! Pure functions over the three raw collections. Aggregates are recomputed
//! from scratch on every call; nothing here performs I/O or can fail.
//! Unresolvable foreign keys contribute zero.
//!
//! "Top N" selections follow the collection order returned by the upstream
//! source, not activity ranking.

use crate::{Comment, Post, PostId, User, UserId};
use serde::Serialize;
use std::collections::HashMap;

/// Users shown on the posts/comments bar chart.
pub const PER_USER_LIMIT: usize = 8;
/// Users included in the contributor share breakdown.
pub const CONTRIBUTOR_LIMIT: usize = 5;
/// Posts shown in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Post and comment counts for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserActivity {
    pub user_id: UserId,
    pub name: String,
    pub posts: usize,
    /// Comments left on any of this user's posts.
    pub comments: usize,
}

/// One slice of the contributor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorShare {
    pub user_id: UserId,
    pub name: String,
    pub posts: usize,
    /// Fraction of posts among the selected contributors, in `0.0..=1.0`.
    pub share: f64,
}

impl ContributorShare {
    pub fn percent(&self) -> f64 {
        self.share * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub average_engagement: f64,
}

impl Totals {
    /// Comments per post rounded to one decimal. Zero posts yields 0.0.
    pub fn average_engagement(posts: usize, comments: usize) -> f64 {
        if posts == 0 {
            return 0.0;
        }
        let ratio = comments as f64 / posts as f64;
        (ratio * 10.0).round() / 10.0
    }
}

/// Everything the charts need, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub per_user: Vec<UserActivity>,
    pub contributors: Vec<ContributorShare>,
    pub totals: Totals,
}

/// Compute chart aggregates.
///
/// Returns `None` unless all three collections are present, so partial data
/// never produces partial aggregates. Empty collections are valid input.
pub fn compute_metrics(
    users: Option<&[User]>,
    posts: Option<&[Post]>,
    comments: Option<&[Comment]>,
) -> Option<DashboardMetrics> {
    let (users, posts, comments) = (users?, posts?, comments?);

    let post_counts = posts_per_user(posts);
    let comment_counts = comments_per_user(posts, comments);

    let per_user = users
        .iter()
        .take(PER_USER_LIMIT)
        .map(|user| UserActivity {
            user_id: user.id,
            name: user.first_name().to_string(),
            posts: post_counts.get(&user.id).copied().unwrap_or(0),
            comments: comment_counts.get(&user.id).copied().unwrap_or(0),
        })
        .collect();

    let selected: Vec<(&User, usize)> = users
        .iter()
        .take(CONTRIBUTOR_LIMIT)
        .map(|user| (user, post_counts.get(&user.id).copied().unwrap_or(0)))
        .collect();
    let selected_total: usize = selected.iter().map(|(_, count)| count).sum();
    let contributors = selected
        .into_iter()
        .map(|(user, count)| ContributorShare {
            user_id: user.id,
            name: user.first_name().to_string(),
            posts: count,
            share: if selected_total == 0 {
                0.0
            } else {
                count as f64 / selected_total as f64
            },
        })
        .collect();

    let totals = Totals {
        users: users.len(),
        posts: posts.len(),
        comments: comments.len(),
        average_engagement: Totals::average_engagement(posts.len(), comments.len()),
    };

    Some(DashboardMetrics {
        per_user,
        contributors,
        totals,
    })
}

/// Headline card values, each available as soon as its own collection is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricCards {
    pub users: Option<usize>,
    pub posts: Option<usize>,
    pub comments: Option<usize>,
    /// Needs both posts and comments.
    pub average_engagement: Option<f64>,
}

impl MetricCards {
    pub fn from_partial(
        users: Option<&[User]>,
        posts: Option<&[Post]>,
        comments: Option<&[Comment]>,
    ) -> Self {
        let average_engagement = match (posts, comments) {
            (Some(posts), Some(comments)) => {
                Some(Totals::average_engagement(posts.len(), comments.len()))
            }
            _ => None,
        };
        Self {
            users: users.map(<[User]>::len),
            posts: posts.map(<[Post]>::len),
            comments: comments.map(<[Comment]>::len),
            average_engagement,
        }
    }
}

/// A row of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    pub post_id: PostId,
    pub title: String,
    pub author: String,
    /// Comments across every post by the same author.
    pub author_comments: usize,
}

/// The first `limit` posts with author names resolved.
///
/// Works with whatever is loaded: an unknown or not-yet-loaded author falls
/// back to `User {id}`, and missing comments count as zero.
pub fn recent_activity(
    users: Option<&[User]>,
    posts: &[Post],
    comments: Option<&[Comment]>,
    limit: usize,
) -> Vec<ActivityItem> {
    let names: HashMap<UserId, &str> = users
        .unwrap_or_default()
        .iter()
        .map(|user| (user.id, user.name.as_str()))
        .collect();
    let comment_counts = comments
        .map(|comments| comments_per_user(posts, comments))
        .unwrap_or_default();

    posts
        .iter()
        .take(limit)
        .map(|post| ActivityItem {
            post_id: post.id,
            title: post.title.clone(),
            author: names
                .get(&post.user_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("User {}", post.user_id)),
            author_comments: comment_counts.get(&post.user_id).copied().unwrap_or(0),
        })
        .collect()
}

fn posts_per_user(posts: &[Post]) -> HashMap<UserId, usize> {
    let mut counts = HashMap::new();
    for post in posts {
        *counts.entry(post.user_id).or_insert(0) += 1;
    }
    counts
}

/// Two-hop join: comment -> post -> user.
fn comments_per_user(posts: &[Post], comments: &[Comment]) -> HashMap<UserId, usize> {
    let mut owners: HashMap<PostId, UserId> = HashMap::with_capacity(posts.len());
    for post in posts {
        owners.entry(post.id).or_insert(post.user_id);
    }

    let mut counts = HashMap::new();
    for comment in comments {
        if let Some(owner) = owners.get(&comment.post_id) {
            *counts.entry(*owner).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, Company};

    fn user(id: UserId, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: Address {
                street: None,
                suite: None,
                city: "Springfield".to_string(),
                zipcode: "00000".to_string(),
            },
            company: Company {
                name: "Acme".to_string(),
                catch_phrase: String::new(),
                bs: None,
            },
            phone: None,
            website: None,
        }
    }

    fn post(id: PostId, user_id: UserId, title: &str) -> Post {
        Post {
            user_id,
            id,
            title: title.to_string(),
            body: String::new(),
        }
    }

    fn comment(id: u64, post_id: PostId) -> Comment {
        Comment {
            post_id,
            id,
            name: String::new(),
            email: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_reference_example() {
        let users = vec![user(1, "Ann"), user(2, "Bo")];
        let posts = vec![post(10, 1, "Hi"), post(11, 2, "Yo")];
        let comments = vec![comment(100, 10)];

        let metrics = compute_metrics(Some(&users), Some(&posts), Some(&comments)).unwrap();

        assert_eq!(metrics.per_user.len(), 2);
        assert_eq!(metrics.per_user[0].name, "Ann");
        assert_eq!((metrics.per_user[0].posts, metrics.per_user[0].comments), (1, 1));
        assert_eq!(metrics.per_user[1].name, "Bo");
        assert_eq!((metrics.per_user[1].posts, metrics.per_user[1].comments), (1, 0));
        assert_eq!(metrics.totals.users, 2);
        assert_eq!(metrics.totals.posts, 2);
        assert_eq!(metrics.totals.comments, 1);
        assert_eq!(metrics.totals.average_engagement, 0.5);
    }

    #[test]
    fn test_absent_input_yields_none() {
        let users = vec![user(1, "Ann")];
        let posts: Vec<Post> = Vec::new();
        let comments: Vec<Comment> = Vec::new();

        assert!(compute_metrics(None, Some(&posts), Some(&comments)).is_none());
        assert!(compute_metrics(Some(&users), None, Some(&comments)).is_none());
        assert!(compute_metrics(Some(&users), Some(&posts), None).is_none());
    }

    #[test]
    fn test_empty_collections_are_all_zero() {
        let metrics = compute_metrics(Some(&[]), Some(&[]), Some(&[])).unwrap();
        assert!(metrics.per_user.is_empty());
        assert!(metrics.contributors.is_empty());
        assert_eq!(
            metrics.totals,
            Totals {
                users: 0,
                posts: 0,
                comments: 0,
                average_engagement: 0.0,
            }
        );
    }

    #[test]
    fn test_top_n_follows_input_order() {
        let users: Vec<User> = (1..=10).map(|id| user(id, &format!("U{id} Last"))).collect();
        // The last user is by far the most active but is never selected.
        let posts: Vec<Post> = (0..20).map(|i| post(i, 10, "busy")).collect();

        let metrics = compute_metrics(Some(&users), Some(&posts), Some(&[])).unwrap();

        let per_user_ids: Vec<UserId> = metrics.per_user.iter().map(|u| u.user_id).collect();
        assert_eq!(per_user_ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let contributor_ids: Vec<UserId> =
            metrics.contributors.iter().map(|c| c.user_id).collect();
        assert_eq!(contributor_ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(metrics.per_user[0].name, "U1");
    }

    #[test]
    fn test_contributor_shares() {
        let users = vec![user(1, "Ann"), user(2, "Bo"), user(3, "Cy")];
        let posts = vec![post(1, 1, "a"), post(2, 1, "b"), post(3, 1, "c"), post(4, 2, "d")];

        let metrics = compute_metrics(Some(&users), Some(&posts), Some(&[])).unwrap();

        assert_eq!(metrics.contributors[0].share, 0.75);
        assert_eq!(metrics.contributors[1].share, 0.25);
        assert_eq!(metrics.contributors[2].share, 0.0);
        assert_eq!(metrics.contributors[0].percent(), 75.0);
    }

    #[test]
    fn test_contributor_shares_without_posts_are_zero() {
        let users = vec![user(1, "Ann"), user(2, "Bo")];
        let metrics = compute_metrics(Some(&users), Some(&[]), Some(&[])).unwrap();
        assert!(metrics.contributors.iter().all(|c| c.share == 0.0));
    }

    #[test]
    fn test_unmatched_joins_contribute_nothing() {
        let users = vec![user(1, "Ann")];
        let posts = vec![post(10, 1, "mine"), post(11, 99, "orphan")];
        let comments = vec![comment(1, 10), comment(2, 11), comment(3, 404)];

        let metrics = compute_metrics(Some(&users), Some(&posts), Some(&comments)).unwrap();

        assert_eq!(metrics.per_user[0].posts, 1);
        assert_eq!(metrics.per_user[0].comments, 1);
        assert_eq!(metrics.totals.posts, 2);
        assert_eq!(metrics.totals.comments, 3);
    }

    #[test]
    fn test_average_engagement_rounding() {
        assert_eq!(Totals::average_engagement(0, 12), 0.0);
        assert_eq!(Totals::average_engagement(3, 1), 0.3);
        assert_eq!(Totals::average_engagement(3, 2), 0.7);
        assert_eq!(Totals::average_engagement(100, 500), 5.0);
    }

    #[test]
    fn test_metric_cards_fill_independently() {
        let users = vec![user(1, "Ann")];
        let posts = vec![post(1, 1, "a"), post(2, 1, "b")];

        let cards = MetricCards::from_partial(Some(&users), None, None);
        assert_eq!(cards.users, Some(1));
        assert_eq!(cards.posts, None);
        assert_eq!(cards.average_engagement, None);

        let cards = MetricCards::from_partial(None, Some(&posts), Some(&[comment(1, 1)]));
        assert_eq!(cards.users, None);
        assert_eq!(cards.posts, Some(2));
        assert_eq!(cards.comments, Some(1));
        assert_eq!(cards.average_engagement, Some(0.5));
    }

    #[test]
    fn test_recent_activity_resolves_authors() {
        let users = vec![user(1, "Ann Lee")];
        let posts = vec![post(10, 1, "first"), post(11, 7, "second"), post(12, 1, "third")];
        let comments = vec![comment(1, 10), comment(2, 12), comment(3, 11)];

        let feed = recent_activity(Some(&users), &posts, Some(&comments), 2);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].author, "Ann Lee");
        assert_eq!(feed[0].author_comments, 2);
        assert_eq!(feed[1].author, "User 7");
        assert_eq!(feed[1].author_comments, 1);
    }

    #[test]
    fn test_recent_activity_without_users_or_comments() {
        let posts = vec![post(10, 3, "only")];
        let feed = recent_activity(None, &posts, None, RECENT_ACTIVITY_LIMIT);
        assert_eq!(feed[0].author, "User 3");
        assert_eq!(feed[0].author_comments, 0);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::{Address, Company};
    use proptest::prelude::*;

    fn arb_dataset() -> impl Strategy<Value = (Vec<User>, Vec<Post>, Vec<Comment>)> {
        (0usize..12, 0usize..40, 0usize..80).prop_flat_map(|(n_users, n_posts, n_comments)| {
            (
                Just(n_users),
                prop::collection::vec(1u64..15, n_posts),
                prop::collection::vec(0u64..45, n_comments),
            )
                .prop_map(|(n_users, post_owners, comment_targets)| {
                    let users = (1..=n_users as u64)
                        .map(|id| User {
                            id,
                            name: format!("User{id} Surname"),
                            username: format!("u{id}"),
                            email: format!("u{id}@example.com"),
                            address: Address {
                                street: None,
                                suite: None,
                                city: "C".to_string(),
                                zipcode: "Z".to_string(),
                            },
                            company: Company {
                                name: "Co".to_string(),
                                catch_phrase: String::new(),
                                bs: None,
                            },
                            phone: None,
                            website: None,
                        })
                        .collect();
                    let posts = post_owners
                        .into_iter()
                        .enumerate()
                        .map(|(i, user_id)| Post {
                            user_id,
                            id: i as u64,
                            title: format!("post {i}"),
                            body: String::new(),
                        })
                        .collect();
                    let comments = comment_targets
                        .into_iter()
                        .enumerate()
                        .map(|(i, post_id)| Comment {
                            post_id,
                            id: i as u64,
                            name: String::new(),
                            email: String::new(),
                            body: String::new(),
                        })
                        .collect();
                    (users, posts, comments)
                })
        })
    }

    proptest! {
        #[test]
        fn per_user_counts_bounded_by_totals((users, posts, comments) in arb_dataset()) {
            let metrics = compute_metrics(Some(&users), Some(&posts), Some(&comments)).unwrap();
            let post_sum: usize = metrics.per_user.iter().map(|u| u.posts).sum();
            let comment_sum: usize = metrics.per_user.iter().map(|u| u.comments).sum();
            prop_assert!(post_sum <= metrics.totals.posts);
            prop_assert!(comment_sum <= metrics.totals.comments);
            prop_assert_eq!(metrics.per_user.len(), users.len().min(PER_USER_LIMIT));
            prop_assert_eq!(metrics.contributors.len(), users.len().min(CONTRIBUTOR_LIMIT));
        }

        #[test]
        fn contributor_shares_sum_to_one_or_zero((users, posts, comments) in arb_dataset()) {
            let metrics = compute_metrics(Some(&users), Some(&posts), Some(&comments)).unwrap();
            let total_posts: usize = metrics.contributors.iter().map(|c| c.posts).sum();
            let share_sum: f64 = metrics.contributors.iter().map(|c| c.share).sum();
            if total_posts == 0 {
                prop_assert_eq!(share_sum, 0.0);
            } else {
                prop_assert!((share_sum - 1.0).abs() < 1e-4);
            }
        }

        #[test]
        fn average_engagement_is_finite(posts in 0usize..10_000, comments in 0usize..10_000) {
            let avg = Totals::average_engagement(posts, comments);
            prop_assert!(avg.is_finite());
            prop_assert!(avg >= 0.0);
        }
    }
}
