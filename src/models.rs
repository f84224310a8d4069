use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decode::{null_as_empty, timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub karma: Option<i64>,
    #[serde(default)]
    pub follower_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subscriber_count: Option<i64>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub featured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<AuthorRef>,
}

impl Community {
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default, rename = "content")]
    pub body: Option<String>,
    pub author: AuthorRef,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comment_count: i64,
    #[serde(rename = "submolt")]
    pub community: Community,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Post {
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: String,
    #[serde(rename = "content")]
    pub body: String,
    pub author: AuthorRef,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "description")]
    pub bio: Option<String>,
    pub karma: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_claimed: Option<bool>,
    pub follower_count: i64,
    pub following_count: i64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReference {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKind {
    Post,
    Comment,
    Community,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Post(String),
    Community(Community),
    Unroutable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default, rename = "submolt")]
    pub community: Option<Community>,
    #[serde(default)]
    pub post: Option<PostReference>,
    #[serde(default)]
    pub post_id: Option<String>,
}

impl SearchResult {
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }

    pub fn search_kind(&self) -> SearchKind {
        match self.kind.to_ascii_lowercase().as_str() {
            "post" => SearchKind::Post,
            "comment" => SearchKind::Comment,
            "submolt" => SearchKind::Community,
            other => SearchKind::Other(other.to_string()),
        }
    }

    pub fn destination(&self) -> Destination {
        match self.search_kind() {
            SearchKind::Post => Destination::Post(self.id.clone()),
            SearchKind::Comment => self
                .post_id
                .clone()
                .or_else(|| self.post.as_ref().map(|post| post.id.clone()))
                .map(Destination::Post)
                .unwrap_or(Destination::Unroutable),
            SearchKind::Community => self
                .community
                .clone()
                .map(Destination::Community)
                .unwrap_or(Destination::Unroutable),
            SearchKind::Other(_) => Destination::Unroutable,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmoltsResponse {
    pub success: bool,
    pub submolts: Vec<Community>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsResponse {
    pub success: bool,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostDetailResponse {
    pub success: bool,
    pub post: Post,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentProfileResponse {
    pub success: bool,
    pub agent: AgentProfile,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recent_posts: Vec<Post>,
}
