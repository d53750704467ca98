// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_data::{
    deliver, render_rows, AppError, BatchProgress, BatchReport, ClientConfig, CommandLineInput,
    DatabaseId, DeliveryTarget, DownloadAllHandler, JsonFileSink, Manifest,
    NotionApiRequestHandler, NotionHttpClient, NotionRequestData, NotionRequestError,
    NotionSortProperty, RunConfig, Task,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_data.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // stdout may carry query output, so the console log goes to stderr
    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("console", Box::new(console_appender)),
        )
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(LevelFilter::Debug),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Builds the request handler over the reqwest transport.
fn build_handler(client: &ClientConfig) -> Result<Arc<NotionApiRequestHandler>, AppError> {
    let transport = Arc::new(NotionHttpClient::new(client)?);
    let handler = NotionApiRequestHandler::new(transport, client.max_pages);
    handler
        .request_error
        .subscribe("cli", |error: &NotionRequestError| {
            if let Some(status) = error.status {
                log::debug!("'{}' failed with HTTP {}: {}", error.asset, status, error.body);
            }
        });
    Ok(Arc::new(handler))
}

/// Runs every selected manifest asset and prints the summary.
async fn run_update(
    config: &RunConfig,
    manifest: &Path,
    assets: &[String],
    halt_on_error: bool,
    cancel: &CancellationToken,
) -> Result<(), AppError> {
    let manifest = Manifest::load(manifest)?;
    let selected = manifest.select(assets)?;
    let handler = build_handler(&config.client)?;

    let report = DownloadAllHandler::new(handler, Arc::new(JsonFileSink), selected)
        .with_default_api_key(config.api_key.clone())
        .with_halt_on_error(halt_on_error)
        .with_progress(Arc::new(|progress: &BatchProgress| {
            log::info!(
                "Progress: {}/{} ({:.0}%) after '{}'",
                progress.total_processed,
                progress.total_to_process,
                progress.fraction() * 100.0,
                progress.asset
            );
        }))
        .run(cancel)
        .await?;

    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(AppError::InternalError {
            message: format!(
                "{} of {} asset(s) failed",
                report.silenced_errors.len(),
                report.total_to_process
            ),
            source: None,
        })
    }
}

fn print_report(report: &BatchReport) {
    for summary in &report.succeeded {
        println!(
            "✓ {}: {} rows ({} page(s)) saved to {}",
            summary.asset,
            summary.rows,
            summary.pages,
            summary.output.display()
        );
    }
    for error in &report.silenced_errors {
        eprintln!("✗ {}", error);
    }
    println!(
        "📄 Updated {}/{} asset(s).",
        report.succeeded.len(),
        report.total_to_process
    );
}

/// Runs a single query and writes its rows to a file or stdout.
async fn run_query(
    config: &RunConfig,
    database: &DatabaseId,
    sorts: &[NotionSortProperty],
    output: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<(), AppError> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let handler = build_handler(&config.client)?;
    let mut request =
        NotionRequestData::new("query", database.clone(), api_key).with_sorts(sorts.to_vec());

    let result = handler
        .web_request_post_with_auth(&mut request, cancel)
        .await?;

    let content = render_rows(&result.data)?;
    deliver(DeliveryTarget::file_or_stdout(output.map(Path::to_path_buf), content))?;

    if let Some(path) = output {
        println!(
            "✓ {} rows ({} page(s)) saved to {}",
            result.data.len(),
            result.pages_fetched,
            path.display()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = RunConfig::resolve(cli)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; cancelling after the current request");
            on_ctrl_c.cancel();
        }
    });

    match &config.task {
        Task::Update {
            manifest,
            assets,
            halt_on_error,
        } => run_update(&config, manifest, assets, *halt_on_error, &cancel).await?,
        Task::Query {
            database,
            sorts,
            output,
        } => run_query(&config, database, sorts, output.as_deref(), &cancel).await?,
    }

    Ok(())
}
