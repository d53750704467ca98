// src/output/types.rs
//! Where rendered rows go, and what happened when they got there.

use std::path::PathBuf;

/// A single output destination.
#[derive(Debug, Clone)]
pub enum DeliveryTarget {
    /// Write content to a file, creating parent directories
    WriteFile { path: PathBuf, content: String },
    /// Print to stdout
    PrintToStdout { content: String },
}

impl DeliveryTarget {
    /// A file target when `path` is given, stdout otherwise.
    pub fn file_or_stdout(path: Option<PathBuf>, content: String) -> Self {
        match path {
            Some(path) => DeliveryTarget::WriteFile { path, content },
            None => DeliveryTarget::PrintToStdout { content },
        }
    }
}

/// Result of delivering one target.
#[derive(Debug, Clone)]
pub struct OutputReport {
    pub target: DeliveryTarget,
    pub bytes_written: usize,
    pub duration_ms: u64,
}
