use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::comments::CommentTree;
use crate::decode::decode;
use crate::error::ApiError;
use crate::models::{
    AgentProfile, AgentProfileResponse, Community, Post, PostDetailResponse, PostsResponse,
    SearchResponse, SearchResult, SubmoltsResponse,
};
use crate::transport::{Endpoint, SortOption, Transport};

pub const DEFAULT_FEED_LIMIT: u32 = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub post: Post,
    pub comments: CommentTree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    pub agent: AgentProfile,
    pub recent_posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
}

pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn submolts(&self) -> Result<Vec<Community>, ApiError> {
        let response: SubmoltsResponse = self.fetch(&Endpoint::Submolts)?;
        flag_unsuccessful("submolts", response.success);
        Ok(response.submolts)
    }

    pub fn global_feed(&self, sort: SortOption, limit: u32) -> Result<Vec<Post>, ApiError> {
        let response: PostsResponse = self.fetch(&Endpoint::GlobalFeed { sort, limit })?;
        flag_unsuccessful("posts", response.success);
        Ok(response.posts)
    }

    pub fn submolt_feed(&self, name: &str) -> Result<Vec<Post>, ApiError> {
        let response: PostsResponse = self.fetch(&Endpoint::SubmoltFeed {
            name: name.to_string(),
        })?;
        flag_unsuccessful("submolt feed", response.success);
        Ok(response.posts)
    }

    pub fn post_detail(&self, id: &str) -> Result<PostDetail, ApiError> {
        let response: PostDetailResponse = self.fetch(&Endpoint::PostDetail { id: id.to_string() })?;
        flag_unsuccessful("post detail", response.success);
        let comments = CommentTree::new(response.comments);
        debug!(
            post = %response.post.id,
            top_level = comments.roots().len(),
            total = comments.total(),
            "api: comment tree loaded"
        );
        Ok(PostDetail {
            post: response.post,
            comments,
        })
    }

    pub fn search(&self, query: &str) -> Result<SearchOutcome, ApiError> {
        let response: SearchResponse = self.fetch(&Endpoint::Search {
            query: query.to_string(),
        })?;
        flag_unsuccessful("search", response.success);
        debug!(
            query,
            echoed = ?response.query,
            kind = ?response.kind,
            results = response.results.len(),
            "api: search answered"
        );
        if let Some(err) = response.error.as_deref() {
            warn!(
                query,
                echoed = ?response.query,
                kind = ?response.kind,
                error = err,
                "api: search reported an error"
            );
        }
        Ok(SearchOutcome {
            results: response.results,
            error: response.error,
        })
    }

    pub fn agent_profile(&self, name: &str) -> Result<ProfilePage, ApiError> {
        let response: AgentProfileResponse = self.fetch(&Endpoint::AgentProfile {
            name: name.to_string(),
        })?;
        flag_unsuccessful("agent profile", response.success);
        Ok(ProfilePage {
            agent: response.agent,
            recent_posts: response.recent_posts,
        })
    }

    fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ApiError> {
        let payload = self.transport.request(endpoint)?;
        let decoded = decode(&payload).map_err(|err| {
            warn!(?endpoint, error = %err, "api: payload did not match schema");
            err
        })?;
        Ok(decoded)
    }
}

fn flag_unsuccessful(what: &str, success: bool) {
    if !success {
        warn!("api: {what} envelope reported success=false");
    }
}
