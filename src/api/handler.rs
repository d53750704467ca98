// src/api/handler.rs
//! Sends a database query and follows its cursor until the last page.

use super::events::EventChannel;
use super::parser::parse_query_response;
use super::request::{
    NotionRequestData, NotionRequestError, NotionRequestFailure, NotionRequestResult,
};
use super::NotionTransport;
use crate::error::AppError;
use crate::parse::NotionDownloadParser;
use crate::types::ApiKey;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Runs database queries one at a time and reports each outcome to
/// subscribers of [`data_received`](Self::data_received) or
/// [`request_error`](Self::request_error).
pub struct NotionApiRequestHandler {
    transport: Arc<dyn NotionTransport>,
    max_pages: u32,
    in_flight: Mutex<Option<Uuid>>,
    pub data_received: EventChannel<NotionRequestResult>,
    pub request_error: EventChannel<NotionRequestError>,
}

/// An error together with the error body the server sent, if any.
struct Failure {
    error: AppError,
    body: Value,
}

impl From<AppError> for Failure {
    fn from(error: AppError) -> Self {
        Self {
            error,
            body: Value::Null,
        }
    }
}

/// Holds the in-flight slot; releases it on drop.
struct InFlightSlot<'a>(&'a Mutex<Option<Uuid>>);

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

impl NotionApiRequestHandler {
    pub fn new(transport: Arc<dyn NotionTransport>, max_pages: u32) -> Self {
        Self {
            transport,
            max_pages,
            in_flight: Mutex::new(None),
            data_received: EventChannel::new(),
            request_error: EventChannel::new(),
        }
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// The id of the request currently being fetched, if any.
    pub fn in_flight(&self) -> Option<Uuid> {
        *self.in_flight.lock()
    }

    /// Queries the request's database, following `next_cursor` until the
    /// server reports no more pages.
    ///
    /// The API key is checked before anything is sent. Every failure is
    /// raised on `request_error` as well as returned; there is no retry.
    /// The request data is reset afterwards either way.
    pub async fn web_request_post_with_auth(
        &self,
        request: &mut NotionRequestData,
        cancel: &CancellationToken,
    ) -> Result<NotionRequestResult, AppError> {
        self.web_request_post_detailed(request, cancel)
            .await
            .map_err(AppError::from)
    }

    /// Like [`web_request_post_with_auth`](Self::web_request_post_with_auth),
    /// but a failure also carries the [`NotionRequestError`] report with the
    /// server's error body.
    pub async fn web_request_post_detailed(
        &self,
        request: &mut NotionRequestData,
        cancel: &CancellationToken,
    ) -> Result<NotionRequestResult, NotionRequestFailure> {
        let api_key = match ApiKey::new(request.api_key()) {
            Ok(key) => key,
            Err(e) => {
                log::error!("Not querying '{}': {}", request.asset(), e);
                let error = AppError::InvalidApiKey(e.to_string());
                let report = NotionRequestError::from_app_error(request, &error, Value::Null);
                self.request_error.raise(&report);
                return Err(NotionRequestFailure { error, report });
            }
        };

        let slot = match self.claim_slot(request.request_id()) {
            Ok(slot) => slot,
            Err(error) => {
                let report = NotionRequestError::from_app_error(request, &error, Value::Null);
                return Err(NotionRequestFailure { error, report });
            }
        };
        let outcome = self.fetch_pages(request, &api_key, cancel).await;
        drop(slot);

        match outcome {
            Ok(()) => {
                let result = NotionRequestResult {
                    asset: request.asset().to_string(),
                    database: request.database().clone(),
                    data: NotionDownloadParser::parse_results(request.results()),
                    pages_fetched: request.pages_fetched(),
                };
                log::info!(
                    "Received {} rows for '{}' in {} page(s)",
                    result.data.len(),
                    result.asset,
                    result.pages_fetched
                );
                request.reset_request_data();
                self.data_received.raise(&result);
                Ok(result)
            }
            Err(Failure { error, body }) => {
                log::error!("Query for '{}' failed: {}", request.asset(), error);
                let report = NotionRequestError::from_app_error(request, &error, body);
                request.reset_request_data();
                self.request_error.raise(&report);
                Err(NotionRequestFailure { error, report })
            }
        }
    }

    fn claim_slot(&self, request_id: Uuid) -> Result<InFlightSlot<'_>, AppError> {
        let mut slot = self.in_flight.lock();
        if let Some(in_flight) = *slot {
            log::warn!(
                "Request {} refused: {} is still in flight",
                request_id,
                in_flight
            );
            return Err(AppError::RequestInFlight { in_flight });
        }
        *slot = Some(request_id);
        Ok(InFlightSlot(&self.in_flight))
    }

    async fn fetch_pages(
        &self,
        request: &mut NotionRequestData,
        api_key: &ApiKey,
        cancel: &CancellationToken,
    ) -> Result<(), Failure> {
        let request_id = request.request_id();
        let database = request.database().to_string();
        let mut cursor: Option<String> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled(database).into());
            }
            if request.pages_fetched() >= self.max_pages {
                return Err(AppError::PageLimitExceeded {
                    database,
                    max_pages: self.max_pages,
                }
                .into());
            }

            let body = request
                .query_body(cursor.as_deref())
                .map_err(AppError::from)?;

            let response = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(AppError::Cancelled(database).into());
                }
                response = self.transport.query_database(api_key, request.database(), &body) => response?,
            };

            let page = parse_query_response(&response).map_err(|failure| Failure {
                error: failure.error,
                body: failure.body,
            })?;

            cursor = page.continuation().map(str::to_owned);
            request.append_result_data(request_id, page.results)?;

            log::debug!(
                "Page {} of '{}' received ({} results so far, more: {})",
                request.pages_fetched(),
                request.asset(),
                request.results().len(),
                cursor.is_some()
            );

            if cursor.is_none() {
                return Ok(());
            }
        }
    }
}
