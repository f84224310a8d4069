use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::run_load;
use crate::api::Client;
use crate::models::{Community, Post};
use crate::state::{FetchState, StateCell};

#[derive(Clone)]
pub struct SubmoltOrchestrator {
    client: Arc<Client>,
    community: Community,
    cell: StateCell<Vec<Post>>,
}

impl SubmoltOrchestrator {
    pub fn new(client: Arc<Client>, community: Community) -> Self {
        Self {
            client,
            community,
            cell: StateCell::new(),
        }
    }

    pub fn community(&self) -> &Community {
        &self.community
    }

    pub fn snapshot(&self) -> FetchState<Vec<Post>> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> Receiver<FetchState<Vec<Post>>> {
        self.cell.subscribe()
    }

    pub fn load(&self) -> FetchState<Vec<Post>> {
        run_load(&self.cell, || self.client.submolt_feed(&self.community.name))
    }
}
