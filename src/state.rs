use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(ApiError),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, FetchState::Loaded(_) | FetchState::Failed(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<Result<T, ApiError>> for FetchState<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => FetchState::Loaded(value),
            Err(err) => FetchState::Failed(err),
        }
    }
}

/// Identifies one load; only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

struct Slot<T> {
    generation: u64,
    state: FetchState<T>,
    watchers: Vec<Sender<FetchState<T>>>,
}

pub struct StateCell<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> StateCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                state: FetchState::Idle,
                watchers: Vec::new(),
            })),
        }
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.slot.lock().state.clone()
    }

    pub fn subscribe(&self) -> Receiver<FetchState<T>> {
        let (tx, rx) = unbounded();
        self.slot.lock().watchers.push(tx);
        rx
    }

    pub fn begin(&self) -> Ticket {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.state = FetchState::Loading;
        notify(&mut slot);
        Ticket(slot.generation)
    }

    /// Publishes the outcome of `ticket`'s load. Returns `false`, leaving the
    /// state untouched, when a newer load has started since.
    pub fn commit(&self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != ticket.0 {
            debug!(
                ticket = ticket.0,
                current = slot.generation,
                "state: discarding superseded result"
            );
            return false;
        }
        slot.state = result.into();
        notify(&mut slot);
        true
    }
}

fn notify<T: Clone>(slot: &mut Slot<T>) {
    let state = slot.state.clone();
    slot.watchers.retain(|tx| tx.send(state.clone()).is_ok());
}
