//! Shared hub fixtures for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hubctl_core::server::Pacer;
use hubctl_core::{HubConfig, Session};
use serde_json::{Value, json};
use wiremock::{MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const USER: &str = "roboto";
pub const PROGRESS_PATH: &str = "/hub/api/users/roboto/server/progress";

pub fn hub_config(server: &MockServer) -> HubConfig {
    HubConfig::new(server.uri(), USER, TOKEN)
}

pub fn session() -> Session {
    Session::new(TOKEN, false).unwrap()
}

/// User model with no active servers.
pub fn user_without_servers() -> Value {
    json!({"name": USER, "servers": {}})
}

/// User model whose default server has the given state.
pub fn user_with_server(pending: Option<&str>, ready: bool) -> Value {
    json!({
        "name": USER,
        "servers": {
            "": {
                "name": "",
                "pending": pending,
                "ready": ready,
                "url": "/user/roboto/",
                "progress_url": PROGRESS_PATH,
            }
        }
    })
}

pub fn json_response(status: u16, body: &Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

/// Wraps progress events in the hub's `data:` framing.
pub fn progress_body(events: &[Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {event}\n\n"))
        .collect()
}

pub fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.to_string())
}

/// Responder that plays `responses` in order, repeating the last one.
pub fn sequence(responses: Vec<ResponseTemplate>) -> impl Fn(&Request) -> ResponseTemplate {
    let calls = Arc::new(AtomicUsize::new(0));
    move |_req: &Request| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        responses[n.min(responses.len() - 1)].clone()
    }
}

/// Pacer that records requested sleeps and returns immediately.
#[derive(Default, Clone)]
pub struct RecordingPacer {
    pub sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Pacer for RecordingPacer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.sleeps.lock().unwrap().push(duration);
        std::future::ready(())
    }
}
