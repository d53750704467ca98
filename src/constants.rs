// src/constants.rs
//! Domain constants that define the operational boundaries of the system.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// The `Notion-Version` header sent unless configured otherwise.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Where the Notion REST API lives.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// How many rows a database query returns per page. This is the Notion
/// API maximum.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// Seconds a single page request may take before it is abandoned.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// How many pages one query may follow before it is treated as runaway.
///
/// At 100 rows per page this allows databases of 10,000 rows.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Environment variable holding the integration secret.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
