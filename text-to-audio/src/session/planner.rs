//! Session directory allocation and per-chunk file naming.
//!
//! Directories are named `{base}_{YYYYMMDD_HHMMSS}` and created with
//! `create_dir_all`, so two conversions of the same source within the same
//! second share a directory and the later one overwrites matching files.

use crate::TIMESTAMP_FORMAT;
use crate::error::{ConversionError, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;

/// Where a conversion writes its audio files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    /// The session directory (already created)
    pub directory: PathBuf,
    /// One path per chunk, in chunk order
    pub file_paths: Vec<PathBuf>,
}

/// Allocates session directories under an output root.
#[derive(Debug, Clone)]
pub struct SessionPlanner {
    output_root: PathBuf,
}

impl SessionPlanner {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// Create the session directory for `base_name` and lay out paths for
    /// `total_chunks` files, stamped with the current local time.
    pub fn plan(&self, base_name: &str, total_chunks: usize) -> Result<SessionPlan> {
        self.plan_at(base_name, total_chunks, &Local::now())
    }

    /// Like [`plan`](Self::plan) with an explicit timestamp.
    pub fn plan_at(
        &self,
        base_name: &str,
        total_chunks: usize,
        now: &DateTime<Local>,
    ) -> Result<SessionPlan> {
        let session_name = format!("{}_{}", base_name, now.format(TIMESTAMP_FORMAT));
        let directory = self.output_root.join(session_name);

        fs::create_dir_all(&directory).map_err(|source| ConversionError::SessionDirectory {
            path: directory.clone(),
            source,
        })?;

        log::info!("Session directory: {}", directory.display());

        let file_paths = (0..total_chunks)
            .map(|index| directory.join(chunk_filename(base_name, index, total_chunks)))
            .collect();

        Ok(SessionPlan {
            directory,
            file_paths,
        })
    }
}

/// File name for chunk `index` (0-based) of `total`.
///
/// A lone chunk is `{base}.wav`; otherwise the 1-based part number is
/// zero-padded to the width of `total` so names sort in chunk order.
pub fn chunk_filename(base_name: &str, index: usize, total: usize) -> String {
    if total <= 1 {
        return format!("{}.wav", base_name);
    }

    let width = total.to_string().len();
    format!(
        "{}_part_{:0width$}_of_{}.wav",
        base_name,
        index + 1,
        total,
        width = width
    )
}
