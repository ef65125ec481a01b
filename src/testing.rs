//! Scripted transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::error::{ClientError, ClientResult};

#[derive(Clone)]
enum Scripted {
    Reply(u16, String),
    Fail(String),
}

/// Replays canned responses keyed by method and path (query included) and
/// records every request. The last response queued for a route repeats.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry((method, path.to_string())).or_default().push_back(scripted);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Scripted::Reply(status, body.to_string()));
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Scripted::Reply(status, body.to_string()));
    }

    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.push(method, path, Scripted::Fail(reason.to_string()));
    }

    /// Drop everything queued for a route so a new script can replace it.
    pub fn reset(&self, method: Method, path: &str) {
        self.routes.lock().unwrap().remove(&(method, path.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Paths requested so far, in order.
    pub fn paths(&self) -> Vec<String> {
        self.requests().iter().map(|r| path_of(&r.url)).collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && path_of(&r.url) == path)
            .count()
    }
}

fn path_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    match without_scheme.find('/') {
        Some(idx) => without_scheme[idx..].to_string(),
        None => "/".to_string(),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let key = (request.method.clone(), path_of(&request.url));
        self.requests.lock().unwrap().push(request);

        let scripted = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Scripted::Reply(status, body)) => Ok(ApiResponse { status, body }),
            Some(Scripted::Fail(reason)) => Err(ClientError::Network(reason)),
            None => Ok(ApiResponse {
                status: 404,
                body: format!("{{\"error\": \"no route for {} {}\"}}", key.0, key.1),
            }),
        }
    }
}
