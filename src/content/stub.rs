//! Scripted HTTP server for exercising the API clients in tests.
//!
//! Answers incoming requests with canned responses, in order, and records
//! what it was sent. Runs until the script is used up or no request arrives
//! for a while.

use serde_json::Value;
use std::{
    io::Read,
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::{Header, Response, Server, StatusCode};

const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path and query.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `METHOD /path`, query stripped.
    pub fn line(&self) -> String {
        let path = self.url.split('?').next().unwrap_or_default();
        format!("{} {}", self.method, path)
    }
}

pub struct StubServer {
    /// `http://127.0.0.1:<port>`
    pub url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Serve `script` as `(status, json body)` pairs, one per request.
    pub fn start(script: Vec<(u16, Value)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let url = format!("http://{}", server.server_addr().to_ip().unwrap());
        let recorded = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&recorded);
        let handle = thread::spawn(move || {
            for (status, body) in script {
                let Ok(Some(mut request)) = server.recv_timeout(IDLE_TIMEOUT) else {
                    return;
                };
                let mut text = String::new();
                request.as_reader().read_to_string(&mut text).unwrap();
                log.lock().unwrap().push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_owned(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body: text,
                });

                let response = Response::from_string(body.to_string())
                    .with_status_code(StatusCode(status))
                    .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
                request.respond(response).unwrap();
            }
        });

        Self { url, recorded, handle }
    }

    /// Wait for the script to finish and return every request received.
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().unwrap();
        Arc::try_unwrap(self.recorded).unwrap().into_inner().unwrap()
    }
}
