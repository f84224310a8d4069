use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::run_load;
use crate::api::{Client, ProfilePage};
use crate::state::{FetchState, StateCell};

#[derive(Clone)]
pub struct ProfileOrchestrator {
    client: Arc<Client>,
    name: String,
    cell: StateCell<ProfilePage>,
}

impl ProfileOrchestrator {
    pub fn new(client: Arc<Client>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            cell: StateCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snapshot(&self) -> FetchState<ProfilePage> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> Receiver<FetchState<ProfilePage>> {
        self.cell.subscribe()
    }

    pub fn load(&self) -> FetchState<ProfilePage> {
        run_load(&self.cell, || self.client.agent_profile(&self.name))
    }
}
