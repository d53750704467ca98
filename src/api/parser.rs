// src/api/parser.rs
//! Parsing of query responses, successful or not.

use super::client::ApiResponse;
use super::responses::{NotionApiErrorResponse, NotionError, QueryPage};
use crate::error::{AppError, NotionErrorCode};
use serde_json::Value;

/// A failed response: the error to report and the error body as JSON
/// (`Null` when the body was not JSON).
#[derive(Debug)]
pub struct ErrorResponse {
    pub error: AppError,
    pub body: Value,
}

/// Parses a query response into a page of raw results.
pub fn parse_query_response(result: &ApiResponse<String>) -> Result<QueryPage, ErrorResponse> {
    if !result.status.is_success() {
        return Err(parse_error_response(result));
    }

    serde_json::from_str(&result.data).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", result.url, e);
        ErrorResponse {
            error: AppError::MalformedResponse(format!(
                "{} (body starts: {})",
                e,
                preview(&result.data)
            )),
            body: Value::Null,
        }
    })
}

/// Interprets a non-2xx response body.
pub fn parse_error_response(result: &ApiResponse<String>) -> ErrorResponse {
    let status = result.status.as_u16();
    let body = serde_json::from_str::<Value>(&result.data).unwrap_or(Value::Null);

    let error = if let Ok(notion_error) = serde_json::from_str::<NotionError>(&result.data) {
        AppError::NotionService {
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            status: Some(status),
        }
    } else if let Ok(minimal) = serde_json::from_str::<NotionApiErrorResponse>(&result.data) {
        AppError::NotionService {
            code: NotionErrorCode::from_api_response(&minimal.code),
            message: minimal.message,
            status: Some(status),
        }
    } else {
        AppError::NotionService {
            code: NotionErrorCode::from_http_status(status),
            message: format!("HTTP {} from {}", result.status, result.url),
            status: Some(status),
        }
    };

    ErrorResponse { error, body }
}

fn preview(body: &str) -> String {
    let limit = crate::constants::ERROR_BODY_PREVIEW_LENGTH;
    if body.chars().count() > limit {
        format!("{}...", body.chars().take(limit).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn response(status: StatusCode, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status,
            url: "test_url".to_string(),
        }
    }

    #[test]
    fn test_error_parsing() {
        let error_json = r#"{
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find database with ID: abc123",
            "request_id": "req_123"
        }"#;

        let failure = parse_query_response(&response(StatusCode::NOT_FOUND, error_json)).unwrap_err();
        assert_eq!(failure.body["request_id"], "req_123");
        match failure.error {
            AppError::NotionService { code, status, .. } => {
                assert_eq!(code, NotionErrorCode::ObjectNotFound);
                assert_eq!(status, Some(404));
            }
            other => panic!("Expected NotionService, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_body_falls_back_to_status() {
        let failure =
            parse_query_response(&response(StatusCode::BAD_GATEWAY, "<html>oops</html>")).unwrap_err();
        assert!(failure.body.is_null());
        assert_eq!(failure.error.notion_code(), NotionErrorCode::HttpStatus(502));
    }

    #[test]
    fn test_malformed_success_body() {
        let failure = parse_query_response(&response(StatusCode::OK, "{\"results\": 5}")).unwrap_err();
        assert!(matches!(failure.error, AppError::MalformedResponse(_)));
    }
}
