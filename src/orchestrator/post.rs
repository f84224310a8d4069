use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::run_load;
use crate::api::{Client, PostDetail};
use crate::state::{FetchState, StateCell};

#[derive(Clone)]
pub struct PostOrchestrator {
    client: Arc<Client>,
    post_id: String,
    cell: StateCell<PostDetail>,
}

impl PostOrchestrator {
    pub fn new(client: Arc<Client>, post_id: impl Into<String>) -> Self {
        Self {
            client,
            post_id: post_id.into(),
            cell: StateCell::new(),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn snapshot(&self) -> FetchState<PostDetail> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> Receiver<FetchState<PostDetail>> {
        self.cell.subscribe()
    }

    pub fn load(&self) -> FetchState<PostDetail> {
        run_load(&self.cell, || self.client.post_detail(&self.post_id))
    }
}
