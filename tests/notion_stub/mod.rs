//! A local HTTP stand-in for the Notion query endpoint.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// What the stub saw for one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub notion_version: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

pub struct NotionStub {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

fn header(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

impl NotionStub {
    /// Serves `responses` (status, body) in order, one per request; further
    /// requests get a 500.
    pub fn spawn(responses: Vec<(u16, String)>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start notion stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let mut responses: VecDeque<(u16, String)> = responses.into();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            recorder.lock().push(SeenRequest {
                method: request.method().to_string(),
                path: request.url().to_string(),
                authorization: header(&request, "Authorization"),
                notion_version: header(&request, "Notion-Version"),
                content_type: header(&request, "Content-Type"),
                body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
            });

            let (status, payload) = responses
                .pop_front()
                .unwrap_or((500, r#"{"object":"error","status":500,"code":"internal_server_error","message":"stub exhausted"}"#.to_string()));
            let content_type =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("build header");
            let _ = request.respond(
                tiny_http::Response::from_string(payload)
                    .with_status_code(status)
                    .with_header(content_type),
            );
        });

        Self {
            base_url,
            seen,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().clone()
    }
}

impl Drop for NotionStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
