use crate::config::Config;
use crate::constants::{MANIFEST_FILE_NAME, OUTPUT_DIR_TAG, OUTPUT_TIMESTAMP_FORMAT};
use crate::context::aggregate::{self, Aggregation};
use crate::context::chunker::ChunkPlan;
use crate::context::manifest::{self, Manifest, RunMetadata};
use crate::context::scanner::{self, Scan, ScanPolicy};
use crate::context::types::{ChunkingSummary, ScanCounters};
use crate::error::{Cancelled, RunError};
use crate::io::artifacts;
use crate::progress::{CancelToken, ProgressSink};
use crate::tokenizer::TokenCounter;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub counters: ScanCounters,
    pub chunking: ChunkingSummary,
    pub total_tokens: usize,
    /// Chunk and master files, in write order.
    pub artifacts: Vec<PathBuf>,
    pub advisories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    Cancelled,
}

impl RunOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            RunOutcome::Cancelled => None,
        }
    }
}

/// Why a run stopped early.
enum Halt {
    Cancelled,
    Fatal(RunError),
}

impl From<RunError> for Halt {
    fn from(e: RunError) -> Self {
        Halt::Fatal(e)
    }
}

impl From<Cancelled> for Halt {
    fn from(_: Cancelled) -> Self {
        Halt::Cancelled
    }
}

/// Scanner -> aggregator -> chunker -> manifest, for one input path.
///
/// Everything is written into a hidden staging directory under the output
/// base and renamed into place only after the manifest is on disk, so a
/// cancelled or failed run leaves nothing behind.
pub struct Pipeline<'a> {
    config: &'a Config,
    counter: &'a dyn TokenCounter,
    progress: ProgressSink,
    cancel: CancelToken,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        counter: &'a dyn TokenCounter,
    ) -> Self {
        Self {
            config,
            counter,
            progress: ProgressSink::disabled(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_progress(
        mut self,
        progress: ProgressSink,
    ) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(
        mut self,
        cancel: CancelToken,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run(&self) -> Result<RunOutcome, RunError> {
        match self.execute() {
            Ok(summary) => Ok(RunOutcome::Completed(summary)),
            Err(Halt::Cancelled) => {
                info!("run cancelled");
                self.progress.message("Processing was cancelled.");
                Ok(RunOutcome::Cancelled)
            }
            Err(Halt::Fatal(e)) => Err(e),
        }
    }

    fn execute(&self) -> Result<RunSummary, Halt> {
        let config = self.config;
        config.validate()?;
        let policy = ScanPolicy::with_excludes(&config.exclude)?;

        if !config.input.exists() {
            return Err(RunError::InputNotFound(config.input.clone()).into());
        }
        let input = dunce::canonicalize(&config.input)
            .map_err(|_| RunError::InputNotFound(config.input.clone()))?;
        fs::create_dir_all(&config.output)
            .map_err(|e| RunError::output_dir(&config.output, e))?;
        let output_base = dunce::canonicalize(&config.output)
            .map_err(|e| RunError::output_dir(&config.output, e))?;
        let policy = policy.with_output_dir(&output_base);

        let started = Utc::now();
        let subdir_name = format!(
            "{}{OUTPUT_DIR_TAG}{}",
            input_name(&input),
            started.format(OUTPUT_TIMESTAMP_FORMAT)
        );

        self.progress.message(format!("Scanning {}", input.display()));
        let (Scan { files, tree }, base) = if input.is_dir() {
            (scanner::scan(&input, &policy), input.clone())
        } else {
            let parent = input.parent().map(Path::to_path_buf).unwrap_or_default();
            (scanner::scan_single_file(&input), parent)
        };
        info!(eligible = files.len(), "scan finished");

        let Aggregation {
            master,
            records,
            counters,
        } = aggregate::aggregate(
            &files,
            &base,
            &tree,
            self.counter,
            config.line_options(),
            &self.progress,
            &self.cancel,
        )?;
        let counters = counters.with_tree(&tree);
        let total_tokens = self.counter.count(&master.text());
        info!(total_tokens, processed = counters.processed, "aggregation finished");

        self.cancel.check()?;
        // created only now so the scan above never sees it
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{subdir_name}."))
            .tempdir_in(&output_base)
            .map_err(|e| RunError::output_dir(&output_base, e))?;
        let master_name = format!("masterfile.t-{total_tokens}.txt");
        let mut written: Vec<String> = Vec::new();
        let chunking = if total_tokens > config.chunk_size {
            let plan = ChunkPlan::new(master.lines(), config.chunk_size, self.counter);
            self.progress.message(format!(
                "Splitting {total_tokens} tokens into {} chunks",
                plan.total_chunks()
            ));
            if config.keep_masterfile {
                artifacts::write_lines(&staging.path().join(&master_name), master.lines())?;
                written.push(master_name);
            }
            let mut created = 0usize;
            for chunk in plan.chunks() {
                self.cancel.check()?;
                let name = chunk.file_name();
                artifacts::write_text(&staging.path().join(&name), &chunk.render())?;
                written.push(name);
                created += 1;
            }
            ChunkingSummary {
                enabled: true,
                threshold: config.chunk_size,
                created,
            }
        } else {
            artifacts::write_lines(&staging.path().join(&master_name), master.lines())?;
            written.push(master_name);
            self.progress.message("Chunking not required.");
            ChunkingSummary {
                enabled: false,
                threshold: config.chunk_size,
                created: 0,
            }
        };

        self.cancel.check()?;
        let output_dir = unique_dir(&output_base, &subdir_name);
        let final_name = output_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(subdir_name);
        let metadata = RunMetadata::new(
            &input,
            &final_name,
            started,
            &config.encoding,
            &counters,
            &chunking,
        );
        manifest::write_manifest(
            &staging.path().join(MANIFEST_FILE_NAME),
            &Manifest {
                metadata: &metadata,
                directory_structure: &tree,
                processed_files: &records,
            },
        )?;

        self.cancel.check()?;
        fs::rename(staging.path(), &output_dir)
            .map_err(|e| RunError::output_dir(&output_dir, e))?;
        let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
        self.progress
            .message(format!("Manifest written to {}", manifest_path.display()));
        self.progress
            .message(format!("Done. Output in {}", output_dir.display()));

        Ok(RunSummary {
            artifacts: written.iter().map(|n| output_dir.join(n)).collect(),
            output_dir,
            manifest_path,
            counters,
            chunking,
            total_tokens,
            advisories: config
                .line_options()
                .advisory()
                .map(str::to_string)
                .into_iter()
                .collect(),
        })
    }
}

/// File stem for a file input, directory name for a directory input.
fn input_name(input: &Path) -> String {
    let name = if input.is_file() {
        input.file_stem()
    } else {
        input.file_name()
    };
    name.map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string())
}

/// `base/name`, or `base/name_2`, `base/name_3`... if taken.
fn unique_dir(
    base: &Path,
    name: &str,
) -> PathBuf {
    let first = base.join(name);
    if !first.exists() {
        return first;
    }
    (2usize..)
        .map(|n| base.join(format!("{name}_{n}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_name_uses_stem_for_files() {
        let dir = std::env::temp_dir().join("tokencook_name_test");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("notes.md");
        fs::write(&file, "x").unwrap();
        assert_eq!(input_name(&file), "notes");
        assert_eq!(input_name(&dir), "tokencook_name_test");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unique_dir_appends_suffix() {
        let base = std::env::temp_dir().join("tokencook_unique_test");
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(base.join("run")).unwrap();
        assert_eq!(unique_dir(&base, "run"), base.join("run_2"));
        assert_eq!(unique_dir(&base, "other"), base.join("other"));
        let _ = fs::remove_dir_all(&base);
    }
}
