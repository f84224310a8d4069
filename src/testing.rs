use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::transport::{Endpoint, RawPayload, Transport};

struct Reply {
    result: Result<Value, TransportError>,
    delay: Duration,
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<Endpoint, Reply>>,
    log: Mutex<Vec<Endpoint>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, endpoint: Endpoint, body: Value) {
        self.respond_after(endpoint, body, Duration::ZERO);
    }

    pub fn respond_after(&self, endpoint: Endpoint, body: Value, delay: Duration) {
        self.replies.lock().insert(
            endpoint,
            Reply {
                result: Ok(body),
                delay,
            },
        );
    }

    pub fn fail(&self, endpoint: Endpoint, err: TransportError) {
        self.fail_after(endpoint, err, Duration::ZERO);
    }

    pub fn fail_after(&self, endpoint: Endpoint, err: TransportError, delay: Duration) {
        self.replies.lock().insert(
            endpoint,
            Reply {
                result: Err(err),
                delay,
            },
        );
    }

    pub fn requests(&self) -> Vec<Endpoint> {
        self.log.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.log.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn request(&self, endpoint: &Endpoint) -> Result<RawPayload, TransportError> {
        self.log.lock().push(endpoint.clone());
        let (result, delay) = match self.replies.lock().get(endpoint) {
            Some(reply) => (reply.result.clone(), reply.delay),
            None => (
                Err(TransportError::Network(format!("unscripted {endpoint:?}"))),
                Duration::ZERO,
            ),
        };
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        result.map(|body| RawPayload(body.to_string().into_bytes()))
    }
}

pub fn wait_for<T: Clone>(rx: &Receiver<T>, timeout: Duration, done: impl Fn(&T) -> bool) -> T {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(value) if done(&value) => return value,
            Ok(_) => continue,
            Err(_) => panic!("condition not reached within {timeout:?}"),
        }
    }
}

pub fn author_json(name: &str) -> Value {
    json!({"id": format!("agent-{name}"), "name": name, "karma": 5})
}

pub fn community_json(name: &str) -> Value {
    json!({"id": format!("sub-{name}"), "name": name})
}

pub fn post_json(id: &str, upvotes: i64, downvotes: i64, comments: i64) -> Value {
    json!({
        "id": id,
        "title": format!("title of {id}"),
        "content": "some **markdown** body",
        "author": author_json("clawd"),
        "upvotes": upvotes,
        "downvotes": downvotes,
        "comment_count": comments,
        "submolt": community_json("general"),
        "created_at": "2025-01-30T12:00:00.000Z",
        "url": null
    })
}

pub fn search_json(query: &str, ids: &[&str]) -> Value {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "type": "post",
                "title": format!("{query} hit"),
                "upvotes": 1,
                "downvotes": 0,
                "created_at": "2025-01-30T12:00:00Z",
                "similarity": 0.9
            })
        })
        .collect();
    json!({"success": true, "query": query, "results": results})
}
