// src/config.rs
use crate::constants::{
    API_KEY_ENV, DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS, NOTION_API_BASE_URL, NOTION_VERSION,
};
use crate::error::AppError;
use crate::query::NotionSortProperty;
use crate::types::{DatabaseId, ValidatedUrl, ValidationError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Value of the Notion-Version header
    #[arg(long, global = true, default_value = NOTION_VERSION)]
    pub notion_version: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum number of result pages followed per query
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Base URL of the Notion API
    #[arg(long, global = true, default_value = NOTION_API_BASE_URL)]
    pub api_base_url: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download every asset listed in a manifest
    Update {
        /// Path to the manifest JSON file
        #[arg(short, long)]
        manifest: PathBuf,

        /// Only update the named asset (repeatable)
        #[arg(long = "asset")]
        assets: Vec<String>,

        /// Stop at the first failing asset instead of collecting errors
        #[arg(long, default_value_t = false)]
        halt_on_error: bool,
    },

    /// Query one database and print or save its rows as JSON
    Query {
        /// Notion database URL or ID
        database: String,

        /// Sort as `property:asc` or `property:desc` (repeatable)
        #[arg(long = "sort")]
        sorts: Vec<NotionSortProperty>,

        /// Write rows to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Settings shared by every request the HTTP client sends.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ValidatedUrl,
    pub notion_version: String,
    pub timeout: Duration,
    pub max_pages: u32,
}

impl ClientConfig {
    pub fn new(
        base_url: &str,
        notion_version: impl Into<String>,
        timeout: Duration,
        max_pages: u32,
    ) -> Result<Self, ValidationError> {
        let notion_version = notion_version.into();
        if notion_version.is_empty()
            || !notion_version.chars().all(|c| c.is_ascii_graphic())
        {
            return Err(ValidationError::InvalidNotionVersion(notion_version));
        }
        if max_pages == 0 {
            return Err(ValidationError::ZeroLimit("max_pages"));
        }
        Ok(Self {
            base_url: ValidatedUrl::parse(base_url)?,
            notion_version,
            timeout,
            max_pages,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ValidatedUrl::parse(NOTION_API_BASE_URL)
                .expect("Default API base URL should be valid"),
            notion_version: NOTION_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// What one invocation is asked to do.
#[derive(Debug, Clone)]
pub enum Task {
    Update {
        manifest: PathBuf,
        assets: Vec<String>,
        halt_on_error: bool,
    },
    Query {
        database: DatabaseId,
        sorts: Vec<NotionSortProperty>,
        output: Option<PathBuf>,
    },
}

/// Resolved run configuration, validated and ready to drive a task.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub client: ClientConfig,
    pub verbose: bool,
    pub task: Task,
    /// The key from the environment. Not validated here: the request
    /// handler checks it before anything is sent.
    pub api_key: Option<String>,
}

impl RunConfig {
    /// Resolves CLI input and environment into a run configuration.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with_key(cli, std::env::var(API_KEY_ENV).ok())
    }

    /// Like [`resolve`](Self::resolve), with the key supplied by the caller.
    pub fn resolve_with_key(
        cli: CommandLineInput,
        api_key: Option<String>,
    ) -> Result<Self, AppError> {
        let client = ClientConfig::new(
            &cli.api_base_url,
            cli.notion_version,
            Duration::from_secs(cli.timeout_secs),
            cli.max_pages,
        )?;

        let task = match cli.command {
            Command::Update {
                manifest,
                assets,
                halt_on_error,
            } => Task::Update {
                manifest,
                assets,
                halt_on_error,
            },
            Command::Query {
                database,
                sorts,
                output,
            } => {
                // A manifest may name per-asset keys; a single query cannot.
                if api_key.is_none() {
                    return Err(AppError::MissingConfiguration(format!(
                        "{} environment variable not set",
                        API_KEY_ENV
                    )));
                }
                Task::Query {
                    database: DatabaseId::parse(&database)?,
                    sorts,
                    output,
                }
            }
        };

        Ok(RunConfig {
            client,
            verbose: cli.verbose,
            task,
            api_key,
        })
    }
}
