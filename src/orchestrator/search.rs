use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{after, bounded, select, unbounded, Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::api::{Client, SearchOutcome};
use crate::state::FetchState;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSnapshot {
    pub query: String,
    pub has_searched: bool,
    pub results: FetchState<SearchOutcome>,
}

struct Session {
    snapshot: SearchSnapshot,
    generation: u64,
    // Dropping the sender wakes and cancels the pending debounce.
    pending: Option<Sender<()>>,
    watchers: Vec<Sender<SearchSnapshot>>,
}

struct Shared {
    client: Arc<Client>,
    debounce: Duration,
    session: Mutex<Session>,
}

/// Incremental search. Every query edit invalidates whatever came before it;
/// only the newest query may publish results.
#[derive(Clone)]
pub struct SearchOrchestrator {
    shared: Arc<Shared>,
}

impl SearchOrchestrator {
    pub fn new(client: Arc<Client>) -> Self {
        Self::with_debounce(client, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(client: Arc<Client>, debounce: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                debounce,
                session: Mutex::new(Session {
                    snapshot: SearchSnapshot::default(),
                    generation: 0,
                    pending: None,
                    watchers: Vec::new(),
                }),
            }),
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.session.lock().snapshot.clone()
    }

    pub fn subscribe(&self) -> Receiver<SearchSnapshot> {
        let (tx, rx) = unbounded();
        self.shared.session.lock().watchers.push(tx);
        rx
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let mut session = self.invalidate();
        session.snapshot.query = query.into();

        let trimmed = session.snapshot.query.trim().to_string();
        if trimmed.is_empty() {
            session.snapshot.has_searched = false;
            session.snapshot.results = FetchState::Idle;
            notify(&mut session);
            return;
        }

        let delay = if session.snapshot.has_searched {
            self.shared.debounce
        } else {
            Duration::ZERO
        };
        self.trigger(session, trimmed, delay);
    }

    pub fn retry(&self) {
        let session = self.invalidate();
        let trimmed = session.snapshot.query.trim().to_string();
        if trimmed.is_empty() {
            return;
        }
        self.trigger(session, trimmed, Duration::ZERO);
    }

    pub fn cancel(&self) {
        let mut session = self.invalidate();
        if session.snapshot.results.is_loading() {
            session.snapshot.results = FetchState::Idle;
            notify(&mut session);
        }
    }

    fn invalidate(&self) -> MutexGuard<'_, Session> {
        let mut session = self.shared.session.lock();
        session.generation = session.generation.wrapping_add(1);
        session.pending = None;
        session
    }

    fn trigger(&self, mut session: MutexGuard<'_, Session>, query: String, delay: Duration) {
        let generation = session.generation;
        if delay.is_zero() {
            session.snapshot.has_searched = true;
            session.snapshot.results = FetchState::Loading;
        }
        notify(&mut session);
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        session.pending = Some(cancel_tx);
        drop(session);

        let shared = Arc::clone(&self.shared);
        thread::spawn(move || run_search(&shared, generation, &query, delay, &cancel_rx));
    }
}

fn run_search(
    shared: &Shared,
    generation: u64,
    query: &str,
    delay: Duration,
    cancel: &Receiver<()>,
) {
    if !delay.is_zero() {
        select! {
            recv(cancel) -> _ => {
                debug!(query, "search: debounce cancelled");
                return;
            }
            recv(after(delay)) -> _ => {}
        }
        let mut session = shared.session.lock();
        if session.generation != generation {
            return;
        }
        session.snapshot.has_searched = true;
        session.snapshot.results = FetchState::Loading;
        notify(&mut session);
    }

    debug!(query, generation, "search: issuing request");
    let result = shared.client.search(query);

    let mut session = shared.session.lock();
    if session.generation != generation {
        debug!(
            query,
            generation,
            current = session.generation,
            "search: dropping superseded response"
        );
        return;
    }
    session.pending = None;
    session.snapshot.results = result.into();
    notify(&mut session);
}

fn notify(session: &mut Session) {
    let snapshot = session.snapshot.clone();
    session
        .watchers
        .retain(|tx| tx.send(snapshot.clone()).is_ok());
}
