use crate::context::types::{ChunkingSummary, DirectoryTree, FileRecord, ScanCounters};
use crate::error::RunError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub input_path: String,
    pub output_subdirectory: String,
    pub processing_timestamp_utc: String,
    pub token_encoding: String,
    pub total_files_scanned: usize,
    pub total_files_processed: usize,
    pub total_files_skipped_binary: usize,
    pub total_files_skipped_symlink: usize,
    pub total_entries_skipped_other: usize,
    pub total_files_failed_extraction: usize,
    pub total_estimated_tokens: usize,
    pub chunking_enabled: bool,
    pub chunk_size_threshold: usize,
    pub chunks_created: usize,
    /// Offsets in `processed_files` address the extracted source text, not the emitted files.
    pub char_offsets: &'static str,
}

impl RunMetadata {
    pub fn new(
        input_path: &Path,
        output_subdirectory: &str,
        started: DateTime<Utc>,
        token_encoding: &str,
        counters: &ScanCounters,
        chunking: &ChunkingSummary,
    ) -> Self {
        Self {
            input_path: input_path.display().to_string(),
            output_subdirectory: output_subdirectory.to_string(),
            processing_timestamp_utc: started.to_rfc3339_opts(SecondsFormat::Secs, true),
            token_encoding: token_encoding.to_string(),
            total_files_scanned: counters.scanned,
            total_files_processed: counters.processed,
            total_files_skipped_binary: counters.skipped_binary,
            total_files_skipped_symlink: counters.skipped_symlink,
            total_entries_skipped_other: counters.skipped_other,
            total_files_failed_extraction: counters.failed_extraction,
            total_estimated_tokens: counters.estimated_tokens,
            chunking_enabled: chunking.enabled,
            chunk_size_threshold: chunking.threshold,
            chunks_created: chunking.created,
            char_offsets: "source_text",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub metadata: &'a RunMetadata,
    pub directory_structure: &'a DirectoryTree,
    pub processed_files: &'a [FileRecord],
}

/// Serialize the manifest as pretty JSON. Any failure is fatal to the run.
pub fn write_manifest(
    path: &Path,
    manifest: &Manifest<'_>,
) -> Result<(), RunError> {
    let fail = |source| RunError::Manifest {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| fail(serde_json::Error::io(e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest).map_err(fail)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| fail(serde_json::Error::io(e)))?;
    Ok(())
}
