//! Pure HTTP client wrapper for the Notion API.
//!
//! This module provides a thin wrapper around reqwest for sending database
//! queries. It handles headers, timeouts and authentication without
//! parsing or business logic.

use super::NotionTransport;
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::types::{ApiKey, DatabaseId, ValidatedUrl};
use reqwest::{header, Client, Response};
use serde_json::Value;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: ValidatedUrl,
}

impl NotionHttpClient {
    /// Creates a client carrying the configured Notion version and timeout.
    ///
    /// The API key is attached per request, since assets in one batch may
    /// use different integrations.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(&config.notion_version)?)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(notion_version: &str) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_str(notion_version).map_err(|e| {
                AppError::MissingConfiguration(format!(
                    "Invalid Notion-Version '{}': {}",
                    notion_version, e
                ))
            })?,
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post(
        &self,
        api_key: &ApiKey,
        endpoint: &str,
        body: &Value,
    ) -> Result<Response, AppError> {
        let url = self.base_url.join_endpoint(endpoint);

        log::debug!("POST {}", url);
        log::trace!("   Query body: {}", body);

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.as_str())
            .json(body)
            .send()
            .await?;

        log::debug!("{} (status: {})", endpoint, response.status());

        Ok(response)
    }
}

#[async_trait::async_trait]
impl NotionTransport for NotionHttpClient {
    async fn query_database(
        &self,
        api_key: &ApiKey,
        database: &DatabaseId,
        body: &Value,
    ) -> Result<ApiResponse<String>, AppError> {
        let endpoint = format!("databases/{}/query", database.to_hyphenated());
        let response = self.post(api_key, &endpoint, body).await?;
        extract_response_text(response).await
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
