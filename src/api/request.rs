//! Per-request state and the outcomes handed to event subscribers.

use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::{AppError, NotionErrorCode};
use crate::model::NotionDatabaseQueryResult;
use crate::query::{FilterError, NotionFilterContainer, NotionSortProperty};
use crate::types::DatabaseId;
use serde_json::{json, Value};
use uuid::Uuid;

/// State for one (possibly multi-page) database query.
///
/// Pages are accumulated as raw JSON until the last one arrives. Every
/// append names the request it belongs to; a page tagged with another
/// request's id is rejected.
#[derive(Debug, Clone)]
pub struct NotionRequestData {
    request_id: Uuid,
    asset: String,
    database: DatabaseId,
    api_key: String,
    sorts: Vec<NotionSortProperty>,
    filter: NotionFilterContainer,
    results: Vec<Value>,
    pages_fetched: u32,
}

impl NotionRequestData {
    pub fn new(asset: impl Into<String>, database: DatabaseId, api_key: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            asset: asset.into(),
            database,
            api_key: api_key.into(),
            sorts: Vec::new(),
            filter: NotionFilterContainer::default(),
            results: Vec::new(),
            pages_fetched: 0,
        }
    }

    pub fn with_sorts(mut self, sorts: Vec<NotionSortProperty>) -> Self {
        self.sorts = sorts;
        self
    }

    pub fn with_filter(mut self, filter: NotionFilterContainer) -> Self {
        self.filter = filter;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn database(&self) -> &DatabaseId {
        &self.database
    }

    /// The key exactly as configured; it is validated by the handler.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn results(&self) -> &[Value] {
        &self.results
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Builds the query body. `sorts` and `filter` are only present when
    /// they have content.
    pub fn query_body(&self, start_cursor: Option<&str>) -> Result<Value, FilterError> {
        let mut body = json!({ "page_size": NOTION_API_PAGE_SIZE });

        if !self.sorts.is_empty() {
            body["sorts"] = json!(self.sorts);
        }
        if let Some(filter) = self.filter.to_filter_json()? {
            body["filter"] = filter;
        }
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = json!(cursor);
        }

        Ok(body)
    }

    /// Adds one page of results to the accumulated set.
    pub fn append_result_data(
        &mut self,
        request_id: Uuid,
        results: Vec<Value>,
    ) -> Result<(), AppError> {
        if request_id != self.request_id {
            return Err(AppError::RequestMismatch {
                expected: self.request_id,
                received: request_id,
            });
        }
        self.results.extend(results);
        self.pages_fetched += 1;
        Ok(())
    }

    /// Drops accumulated pages and starts a fresh request id, so the same
    /// request data can be sent again.
    pub fn reset_request_data(&mut self) {
        self.results.clear();
        self.pages_fetched = 0;
        self.request_id = Uuid::new_v4();
    }
}

/// A completed query.
#[derive(Debug, Clone)]
pub struct NotionRequestResult {
    pub asset: String,
    pub database: DatabaseId,
    pub data: NotionDatabaseQueryResult,
    pub pages_fetched: u32,
}

/// A failed query, as reported to subscribers and batch summaries.
#[derive(Debug, Clone)]
pub struct NotionRequestError {
    pub asset: String,
    pub database: String,
    pub code: NotionErrorCode,
    pub message: String,
    pub status: Option<u16>,
    /// The parsed error body; `Null` when there was none.
    pub body: Value,
}

impl NotionRequestError {
    pub fn from_app_error(request: &NotionRequestData, error: &AppError, body: Value) -> Self {
        Self {
            body,
            ..Self::for_asset(&request.asset, &request.database, error)
        }
    }

    /// An error that happened before any response existed.
    pub fn for_asset(asset: &str, database: &DatabaseId, error: &AppError) -> Self {
        let status = match error {
            AppError::NotionService { status, .. } => *status,
            AppError::NetworkFailure(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        };
        Self {
            asset: asset.to_string(),
            database: database.to_string(),
            code: error.notion_code(),
            message: error.to_string(),
            status,
            body: Value::Null,
        }
    }
}

/// A failed query: the error for the caller plus the report built for
/// subscribers, parsed error body included.
#[derive(Debug)]
pub struct NotionRequestFailure {
    pub error: AppError,
    pub report: NotionRequestError,
}

impl From<NotionRequestFailure> for AppError {
    fn from(failure: NotionRequestFailure) -> Self {
        failure.error
    }
}

impl std::fmt::Display for NotionRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.asset, self.code, self.message)
    }
}
