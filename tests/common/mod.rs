//! Shared fixtures: Notion page objects and an in-memory transport.

#![allow(dead_code)]

use notion_data::{ApiKey, ApiResponse, AppError, DatabaseId, NotionTransport};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const API_KEY: &str = "secret_test_key_123456789";
pub const ITEMS_DB: &str = "550e8400e29b41d4a716446655440000";

pub fn database(hex: &str) -> DatabaseId {
    DatabaseId::parse(hex).expect("test database id should be valid")
}

pub fn rich_text(text: &str) -> Value {
    json!([{
        "type": "text",
        "text": {"content": text, "link": null},
        "plain_text": text,
        "href": null
    }])
}

/// A database page with a title and a number column.
pub fn item_page(id: &str, name: &str, cost: f64) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "Name": {"id": "title", "type": "title", "title": rich_text(name)},
            "Cost": {"id": "c0st", "type": "number", "number": cost}
        }
    })
}

pub fn query_page(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": results,
        "next_cursor": next_cursor,
        "has_more": next_cursor.is_some()
    })
}

pub fn ok(body: Value) -> ApiResponse<String> {
    ApiResponse {
        data: body.to_string(),
        status: StatusCode::OK,
        url: "mock://query".to_string(),
    }
}

pub fn not_found(database: &DatabaseId) -> ApiResponse<String> {
    ApiResponse {
        data: json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": format!("Could not find database with ID: {}", database.to_hyphenated()),
            "request_id": "req_404"
        })
        .to_string(),
        status: StatusCode::NOT_FOUND,
        url: "mock://query".to_string(),
    }
}

/// One call the transport received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub database: String,
    pub body: Value,
}

type Responder = Box<dyn Fn(&DatabaseId, &Value) -> ApiResponse<String> + Send + Sync>;

/// Answers queries from a closure and records every call.
pub struct MockTransport {
    respond: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&DatabaseId, &Value) -> ApiResponse<String> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves `pages` in order, keyed by the body's `start_cursor`: the
    /// first page answers a body without one, page `n` answers cursor
    /// `"cursor-n"`.
    pub fn paged(pages: Vec<Value>) -> Self {
        Self::new(move |_, body| {
            let index = match body.get("start_cursor").and_then(Value::as_str) {
                None => 0,
                Some(cursor) => cursor
                    .trim_start_matches("cursor-")
                    .parse::<usize>()
                    .unwrap_or(usize::MAX),
            };
            match pages.get(index) {
                Some(page) => ok(page.clone()),
                None => ApiResponse {
                    data: r#"{"object":"error","status":400,"code":"validation_error","message":"bad cursor"}"#.to_string(),
                    status: StatusCode::BAD_REQUEST,
                    url: "mock://query".to_string(),
                },
            }
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait::async_trait]
impl NotionTransport for MockTransport {
    async fn query_database(
        &self,
        _api_key: &ApiKey,
        database: &DatabaseId,
        body: &Value,
    ) -> Result<ApiResponse<String>, AppError> {
        self.calls.lock().push(RecordedCall {
            database: database.as_str().to_string(),
            body: body.clone(),
        });
        Ok((self.respond)(database, body))
    }
}
