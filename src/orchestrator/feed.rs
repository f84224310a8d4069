use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use tracing::debug;

use super::run_load;
use crate::api::{Client, DEFAULT_FEED_LIMIT};
use crate::error::ApiError;
use crate::models::{Community, Post};
use crate::state::{FetchState, StateCell};
use crate::transport::SortOption;

#[derive(Debug, Clone, PartialEq)]
pub struct HomeFeed {
    pub communities: Vec<Community>,
    pub posts: Vec<Post>,
}

enum Branch {
    Communities(Result<Vec<Community>, ApiError>),
    Posts(Result<Vec<Post>, ApiError>),
}

#[derive(Clone)]
pub struct FeedOrchestrator {
    client: Arc<Client>,
    sort: SortOption,
    limit: u32,
    cell: StateCell<HomeFeed>,
}

impl FeedOrchestrator {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            sort: SortOption::Hot,
            limit: DEFAULT_FEED_LIMIT,
            cell: StateCell::new(),
        }
    }

    pub fn with_listing(mut self, sort: SortOption, limit: u32) -> Self {
        self.sort = sort;
        self.limit = limit;
        self
    }

    pub fn snapshot(&self) -> FetchState<HomeFeed> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> Receiver<FetchState<HomeFeed>> {
        self.cell.subscribe()
    }

    /// Publishes `Loaded` only when both halves succeed. Otherwise the first
    /// failure to arrive wins and the other half is discarded.
    pub fn load(&self) -> FetchState<HomeFeed> {
        run_load(&self.cell, || fetch_home(&self.client, self.sort, self.limit))
    }
}

fn fetch_home(client: &Client, sort: SortOption, limit: u32) -> Result<HomeFeed, ApiError> {
    let (tx, rx) = bounded(2);
    debug!(sort = sort.as_str(), limit, "feed: fetching communities and posts");

    thread::scope(|scope| {
        let communities_tx = tx.clone();
        scope.spawn(move || {
            let _ = communities_tx.send(Branch::Communities(client.submolts()));
        });
        scope.spawn(move || {
            let _ = tx.send(Branch::Posts(client.global_feed(sort, limit)));
        });
    });

    let mut communities = None;
    let mut posts = None;
    let mut failure = None;
    for branch in rx.try_iter() {
        match branch {
            Branch::Communities(Ok(list)) => communities = Some(list),
            Branch::Posts(Ok(list)) => posts = Some(list),
            Branch::Communities(Err(err)) | Branch::Posts(Err(err)) => {
                failure.get_or_insert(err);
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }
    match (communities, posts) {
        (Some(communities), Some(posts)) => Ok(HomeFeed { communities, posts }),
        _ => Err(ApiError::Network("feed: a fetch ended without a result".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::{community_json, post_json, ScriptedTransport};
    use crate::transport::Endpoint;
    use serde_json::json;
    use std::time::Duration;

    fn feed_endpoint() -> Endpoint {
        Endpoint::GlobalFeed {
            sort: SortOption::Hot,
            limit: 25,
        }
    }

    #[test]
    fn loads_both_halves() {
        let transport = ScriptedTransport::new();
        transport.respond(
            Endpoint::Submolts,
            json!({"success": true, "submolts": [community_json("general"), community_json("rust")]}),
        );
        transport.respond(
            feed_endpoint(),
            json!({"success": true, "posts": [post_json("p1", 9, 2, 3)]}),
        );
        let feed = FeedOrchestrator::new(Arc::new(Client::new(transport.clone())));
        assert_eq!(feed.snapshot(), FetchState::Idle);

        let state = feed.load();
        let home = state.loaded().expect("feed loaded");
        assert_eq!(home.communities.len(), 2);
        assert_eq!(home.posts[0].score(), 7);
        assert_eq!(home.posts[0].comment_count, 3);

        let mut requests = transport.requests();
        requests.sort_by_key(|endpoint| format!("{endpoint:?}"));
        assert_eq!(requests, vec![feed_endpoint(), Endpoint::Submolts]);
    }

    #[test]
    fn failing_posts_discard_loaded_communities() {
        let transport = ScriptedTransport::new();
        transport.respond(
            Endpoint::Submolts,
            json!({"success": true, "submolts": [community_json("general")]}),
        );
        transport.fail(feed_endpoint(), TransportError::HttpStatus(502));
        let feed = FeedOrchestrator::new(Arc::new(Client::new(transport)));
        let rx = feed.subscribe();

        assert_eq!(feed.load(), FetchState::Failed(ApiError::HttpStatus(502)));
        let seen: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            seen,
            vec![
                FetchState::Loading,
                FetchState::Failed(ApiError::HttpStatus(502))
            ]
        );
    }

    #[test]
    fn failing_communities_discard_loaded_posts() {
        let transport = ScriptedTransport::new();
        transport.fail(Endpoint::Submolts, TransportError::Unauthorized);
        transport.respond(
            feed_endpoint(),
            json!({"success": true, "posts": [post_json("p1", 1, 0, 0)]}),
        );
        let feed = FeedOrchestrator::new(Arc::new(Client::new(transport)));
        assert_eq!(feed.load(), FetchState::Failed(ApiError::Unauthorized));
    }

    #[test]
    fn first_failure_to_arrive_wins() {
        let transport = ScriptedTransport::new();
        transport.fail_after(
            Endpoint::Submolts,
            TransportError::HttpStatus(500),
            Duration::from_millis(200),
        );
        transport.fail(feed_endpoint(), TransportError::Network("reset".into()));
        let feed = FeedOrchestrator::new(Arc::new(Client::new(transport)));
        assert_eq!(
            feed.load(),
            FetchState::Failed(ApiError::Network("reset".into()))
        );
    }

    #[test]
    fn halves_run_concurrently() {
        let transport = ScriptedTransport::new();
        let delay = Duration::from_millis(300);
        transport.respond_after(
            Endpoint::Submolts,
            json!({"success": true, "submolts": []}),
            delay,
        );
        transport.respond_after(
            feed_endpoint(),
            json!({"success": true, "posts": []}),
            delay,
        );
        let feed = FeedOrchestrator::new(Arc::new(Client::new(transport)));
        let started = std::time::Instant::now();
        assert!(feed.load().is_settled());
        assert!(started.elapsed() < delay * 2);
    }

    #[test]
    fn custom_listing_reaches_the_wire() {
        let transport = ScriptedTransport::new();
        transport.respond(Endpoint::Submolts, json!({"success": true, "submolts": []}));
        let endpoint = Endpoint::GlobalFeed {
            sort: SortOption::New,
            limit: 10,
        };
        transport.respond(endpoint.clone(), json!({"success": true, "posts": []}));
        let feed = FeedOrchestrator::new(Arc::new(Client::new(transport.clone())))
            .with_listing(SortOption::New, 10);
        assert!(feed.load().loaded().is_some());
        assert!(transport.requests().contains(&endpoint));
    }
}
