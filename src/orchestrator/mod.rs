mod feed;
mod post;
mod profile;
mod search;
mod submolt;

pub use feed::{FeedOrchestrator, HomeFeed};
pub use post::PostOrchestrator;
pub use profile::ProfileOrchestrator;
pub use search::{SearchOrchestrator, SearchSnapshot, DEFAULT_DEBOUNCE};
pub use submolt::SubmoltOrchestrator;

use crate::error::ApiError;
use crate::state::{FetchState, StateCell};

fn run_load<T, F>(cell: &StateCell<T>, fetch: F) -> FetchState<T>
where
    T: Clone,
    F: FnOnce() -> Result<T, ApiError>,
{
    let ticket = cell.begin();
    let result = fetch();
    if let Err(err) = &result {
        tracing::debug!(error = %err, "orchestrator: load failed");
    }
    cell.commit(ticket, result);
    cell.snapshot()
}
