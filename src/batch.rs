// src/batch.rs
//! Downloads a list of assets one after another.

use crate::api::{
    NotionApiRequestHandler, NotionRequestError, NotionRequestFailure, NotionRequestResult,
};
use crate::error::AppError;
use crate::manifest::AssetSpec;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How far a batch has got, reported after every asset.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    pub asset: String,
    pub total_processed: usize,
    pub total_to_process: usize,
}

impl BatchProgress {
    pub fn fraction(&self) -> f32 {
        if self.total_to_process == 0 {
            1.0
        } else {
            self.total_processed as f32 / self.total_to_process as f32
        }
    }
}

/// Receives progress after each asset.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: &BatchProgress);
}

impl<F> ProgressReporter for F
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    fn report(&self, progress: &BatchProgress) {
        self(progress)
    }
}

/// Stores the rows of a successfully downloaded asset.
pub trait AssetSink: Send + Sync {
    fn store(&self, asset: &AssetSpec, result: &NotionRequestResult) -> Result<(), AppError>;
}

/// An asset that downloaded and was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub asset: String,
    pub rows: usize,
    pub pages: u32,
    pub output: PathBuf,
}

/// The outcome of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total_to_process: usize,
    pub total_processed: usize,
    pub succeeded: Vec<AssetSummary>,
    /// Failures collected instead of halting the batch.
    pub silenced_errors: Vec<NotionRequestError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.silenced_errors.is_empty()
    }
}

/// Works through a queue of assets, one request at a time.
///
/// With `halt_on_error` the first failure ends the batch and is returned.
/// Without it, failures are collected in the report and the remaining
/// assets still run. Cancellation always ends the batch.
pub struct DownloadAllHandler {
    handler: Arc<NotionApiRequestHandler>,
    sink: Arc<dyn AssetSink>,
    progress: Option<Arc<dyn ProgressReporter>>,
    pending: VecDeque<AssetSpec>,
    default_api_key: Option<String>,
    halt_on_error: bool,
    report: BatchReport,
}

impl DownloadAllHandler {
    pub fn new(
        handler: Arc<NotionApiRequestHandler>,
        sink: Arc<dyn AssetSink>,
        assets: Vec<AssetSpec>,
    ) -> Self {
        let report = BatchReport {
            total_to_process: assets.len(),
            ..BatchReport::default()
        };
        Self {
            handler,
            sink,
            progress: None,
            pending: assets.into(),
            default_api_key: None,
            halt_on_error: false,
            report,
        }
    }

    pub fn with_default_api_key(mut self, api_key: Option<String>) -> Self {
        self.default_api_key = api_key;
        self
    }

    pub fn with_halt_on_error(mut self, halt_on_error: bool) -> Self {
        self.halt_on_error = halt_on_error;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    /// Runs every pending asset and returns the report.
    pub async fn run(mut self, cancel: &CancellationToken) -> Result<BatchReport, AppError> {
        log::info!(
            "Updating {} asset(s){}",
            self.report.total_to_process,
            if self.halt_on_error {
                " (halting on first error)"
            } else {
                ""
            }
        );

        while self.process_next_asset(cancel).await? {}

        log::info!(
            "Batch finished: {} succeeded, {} failed",
            self.report.succeeded.len(),
            self.report.silenced_errors.len()
        );
        Ok(self.report)
    }

    /// Downloads and stores the next queued asset.
    ///
    /// Returns `Ok(false)` once the queue is empty.
    pub async fn process_next_asset(&mut self, cancel: &CancellationToken) -> Result<bool, AppError> {
        let Some(asset) = self.pending.pop_front() else {
            return Ok(false);
        };

        log::info!(
            "[{}/{}] Updating '{}'",
            self.report.total_processed + 1,
            self.report.total_to_process,
            asset.name
        );

        let outcome = self.download(&asset, cancel).await;
        self.report.total_processed += 1;

        if let Some(progress) = &self.progress {
            progress.report(&BatchProgress {
                asset: asset.name.clone(),
                total_processed: self.report.total_processed,
                total_to_process: self.report.total_to_process,
            });
        }

        match outcome {
            Ok(summary) => {
                self.report.succeeded.push(summary);
                Ok(true)
            }
            Err(failure)
                if self.halt_on_error || matches!(failure.error, AppError::Cancelled(_)) =>
            {
                self.pending.clear();
                Err(failure.error)
            }
            Err(failure) => {
                log::warn!(
                    "Continuing after failure of '{}': {}",
                    asset.name,
                    failure.error
                );
                self.report.silenced_errors.push(failure.report);
                Ok(true)
            }
        }
    }

    async fn download(
        &self,
        asset: &AssetSpec,
        cancel: &CancellationToken,
    ) -> Result<AssetSummary, NotionRequestFailure> {
        let local_failure = |error: AppError| NotionRequestFailure {
            report: NotionRequestError::for_asset(&asset.name, &asset.database, &error),
            error,
        };

        let api_key = asset
            .resolve_api_key(self.default_api_key.as_deref())
            .map_err(local_failure)?;
        let mut request = asset.to_request(api_key);

        let result = self
            .handler
            .web_request_post_detailed(&mut request, cancel)
            .await?;
        self.sink.store(asset, &result).map_err(local_failure)?;

        Ok(AssetSummary {
            asset: asset.name.clone(),
            rows: result.data.len(),
            pages: result.pages_fetched,
            output: asset.output.clone(),
        })
    }
}
