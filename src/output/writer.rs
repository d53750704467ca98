// src/output/writer.rs
//! Executes output operations by performing actual I/O.

use super::types::*;
use crate::api::NotionRequestResult;
use crate::batch::AssetSink;
use crate::error::AppError;
use crate::manifest::AssetSpec;
use crate::model::NotionDatabaseQueryResult;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Renders rows as a pretty-printed JSON array with a trailing newline.
pub fn render_rows(result: &NotionDatabaseQueryResult) -> Result<String, AppError> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    Ok(json)
}

/// Delivers one target, performing its I/O.
pub fn deliver(target: DeliveryTarget) -> Result<OutputReport, AppError> {
    let start_time = Instant::now();

    let bytes_written = match &target {
        DeliveryTarget::WriteFile { path, content } => write_file(path, content)?,
        DeliveryTarget::PrintToStdout { content } => {
            print_to_stdout(content)?;
            content.len()
        }
    };

    Ok(OutputReport {
        target,
        bytes_written,
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}

/// Writes content to a file.
fn write_file(path: &Path, content: &str) -> Result<usize, AppError> {
    log::debug!("Writing {} bytes to {}", content.len(), path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;

    log::info!("Wrote file: {}", path.display());
    Ok(content.len())
}

/// Prints content to stdout.
fn print_to_stdout(content: &str) -> Result<(), AppError> {
    print!("{}", content);
    std::io::stdout().flush()?;
    Ok(())
}

/// Writes each downloaded asset to its manifest output path.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileSink;

impl AssetSink for JsonFileSink {
    fn store(&self, asset: &AssetSpec, result: &NotionRequestResult) -> Result<(), AppError> {
        let content = render_rows(&result.data)?;
        deliver(DeliveryTarget::WriteFile {
            path: asset.output.clone(),
            content,
        })?;
        Ok(())
    }
}
