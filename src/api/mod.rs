// src/api/mod.rs
//! Notion API interaction: querying databases page by page.
//!
//! I/O lives behind [`NotionTransport`]; parsing and request bookkeeping
//! are plain functions and data, so the handler can be driven by any
//! transport in tests.

pub mod client;
mod events;
mod handler;
pub mod parser;
mod request;
mod responses;

use crate::error::AppError;
use crate::types::{ApiKey, DatabaseId};
use serde_json::Value;

pub use client::{ApiResponse, NotionHttpClient};
pub use events::EventChannel;
pub use handler::NotionApiRequestHandler;
pub use request::{
    NotionRequestData, NotionRequestError, NotionRequestFailure, NotionRequestResult,
};
pub use responses::{NotionApiErrorResponse, NotionError, PaginatedResponse, QueryPage};

/// The ability to send one database query to Notion.
///
/// Implementations return the raw status and body; interpreting them is
/// the handler's job.
#[async_trait::async_trait]
pub trait NotionTransport: Send + Sync {
    async fn query_database(
        &self,
        api_key: &ApiKey,
        database: &DatabaseId,
        body: &Value,
    ) -> Result<ApiResponse<String>, AppError>;
}
