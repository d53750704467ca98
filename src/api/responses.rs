// src/api/responses.rs
//! Response shapes returned by the database query endpoint.

use serde::{Deserialize, Serialize};

// Notion's error object, as modelled by notion-client
pub use notion_client::objects::error::Error as NotionError;

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// One page of a database query, with page objects left as raw JSON so the
/// download parser can keep each property's source text.
pub type QueryPage = PaginatedResponse<serde_json::Value>;

impl<T> PaginatedResponse<T> {
    /// The cursor to request next, if the server says there is more.
    pub fn continuation(&self) -> Option<&str> {
        if self.has_more {
            self.next_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Minimal error body, for servers that send `code`/`message` without the
/// rest of Notion's error object.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionApiErrorResponse {
    pub code: String,
    pub message: String,
}
