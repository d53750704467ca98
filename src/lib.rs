// src/lib.rs
//! notion-data library: downloads Notion databases into typed rows.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `NotionErrorCode`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `RunConfig`, `ClientConfig`
//! - **Domain model**: `NotionDatabaseRow`, `NotionProperty`, `PropertyValue`
//! - **Download parsing**: `NotionDownloadParser` and the per-type parsers
//! - **Queries**: filter trees and sorts sent with a database query
//! - **API client**: `NotionApiRequestHandler`, `NotionTransport`, `NotionHttpClient`
//! - **Batches**: `Manifest`, `DownloadAllHandler`, `BatchReport`

mod api;
mod batch;
mod config;
mod constants;
mod error;
mod manifest;
mod model;
mod output;
mod parse;
mod query;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ClientConfig, Command, CommandLineInput, RunConfig, Task};
pub use crate::constants::{
    API_KEY_ENV, DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS, NOTION_API_BASE_URL,
    NOTION_API_PAGE_SIZE, NOTION_VERSION,
};

// --- Domain Model ---
pub use crate::model::{
    ConversionError, FromNotionProperty, FromNotionRow, NotionDatabaseQueryResult,
    NotionDatabaseRow, NotionDate, NotionProperty, PropertyKind, PropertyValue,
};

// --- Domain Types ---
pub use crate::types::{
    ApiKey, DatabaseId, NotionSecretKeyValidator, PropertyKey, ValidatedUrl,
};

// --- Download Parsing ---
pub use crate::parse::{
    build_property, parser_for, NotionDownloadParser, NotionPropertyParser, ParsedValue,
    PropertyParseError,
};

// --- Queries ---
pub use crate::query::{
    FilterError, FilterOperator, FilterPropertyType, NotionFilterContainer, NotionFilterEntry,
    NotionFilterGrouping, NotionFilterOption, NotionFilterRollup, NotionSortProperty,
    RollupAggregate, SortDirection,
};

// --- API Client ---
pub use crate::api::{
    parser::{parse_error_response, parse_query_response, ErrorResponse},
    ApiResponse, EventChannel, NotionApiRequestHandler, NotionHttpClient, NotionRequestData,
    NotionRequestError, NotionRequestFailure, NotionRequestResult, NotionTransport, QueryPage,
};

// --- Batches & Output ---
pub use crate::batch::{
    AssetSink, AssetSummary, BatchProgress, BatchReport, DownloadAllHandler, ProgressReporter,
};
pub use crate::manifest::{AssetSpec, Manifest};
pub use crate::output::{deliver, render_rows, DeliveryTarget, JsonFileSink, OutputReport};
