//! Builds the master document from the eligible files of a scan.

use crate::constants::{LINE_NUMBER_WIDTH, TREE_HEADING};
use crate::context::extract::{self, Extracted};
use crate::context::types::{DirectoryTree, ExtractionStatus, FileRecord, ScanCounters};
use crate::error::Cancelled;
use crate::progress::{CancelToken, ProgressSink};
use crate::tokenizer::TokenCounter;
use path_slash::PathExt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const NUMBERING_ADVISORY: &str = "line numbers follow the original file positions; with empty-line skipping enabled they will not be contiguous";

/// Per-line content options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineOptions {
    pub line_numbers: bool,
    pub skip_empty_lines: bool,
}

impl LineOptions {
    pub fn advisory(&self) -> Option<&'static str> {
        (self.line_numbers && self.skip_empty_lines).then_some(NUMBERING_ADVISORY)
    }

    /// Keep printable-ASCII lines, optionally drop blank ones, optionally
    /// prefix the original 1-based line position.
    pub fn filter(
        &self,
        text: &str,
    ) -> Vec<String> {
        split_lines(text)
            .into_iter()
            .enumerate()
            .filter(|(_, line)| is_printable_ascii(line))
            .filter(|(_, line)| !(self.skip_empty_lines && line.trim().is_empty()))
            .map(|(idx, line)| {
                if self.line_numbers {
                    format!("{:0width$} {line}", idx + 1, width = LINE_NUMBER_WIDTH)
                } else {
                    line.to_string()
                }
            })
            .collect()
    }
}

/// Line boundaries: `\r\n`, `\r`, `\n`, vertical tab, form feed, the
/// file/group/record separators, NEL and the Unicode line/paragraph
/// separators. A trailing boundary does not produce an empty last line.
pub fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

pub fn split_lines(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        out.push(&text[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
            start += 1;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

pub fn is_printable_ascii(line: &str) -> bool {
    line.chars().all(|c| (' '..='~').contains(&c))
}

pub fn start_marker(abs_path: &str) -> String {
    format!("=== File Start: {abs_path} ===")
}

pub fn end_marker(abs_path: &str) -> String {
    format!("=== File End: {abs_path} ===")
}

/// Ordered line sequence handed to the chunker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterDocument {
    lines: Vec<String>,
}

impl MasterDocument {
    pub fn with_tree(tree: &DirectoryTree) -> Self {
        let mut lines = vec![TREE_HEADING.to_string()];
        lines.extend(tree.render_lines());
        lines.push(String::new());
        Self { lines }
    }

    fn push_file(
        &mut self,
        abs_path: &str,
        body: Vec<String>,
    ) {
        self.lines.push(start_marker(abs_path));
        self.lines.extend(body);
        self.lines.push(end_marker(abs_path));
        self.lines.push(String::new());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub master: MasterDocument,
    pub records: Vec<FileRecord>,
    pub counters: ScanCounters,
}

/// Running state carried from one file to the next.
#[derive(Debug, Default)]
struct Accumulator {
    char_offset: usize,
    counters: ScanCounters,
}

impl Accumulator {
    fn success(
        &mut self,
        relative_path: String,
        absolute_path: String,
        extracted: &Extracted,
        tokens: usize,
    ) -> FileRecord {
        let chars = extracted.text.chars().count();
        let start = self.char_offset;
        self.char_offset += chars;
        self.counters.processed += 1;
        self.counters.estimated_tokens += tokens;
        FileRecord {
            relative_path,
            absolute_path,
            char_start_offset: Some(start),
            char_end_offset: Some(self.char_offset),
            char_count: Some(chars),
            estimated_tokens: Some(tokens),
            extraction_status: ExtractionStatus::Success,
            encoding_used: Some(extracted.encoding.to_string()),
        }
    }

    fn failure(
        &mut self,
        relative_path: String,
        absolute_path: String,
        message: String,
    ) -> FileRecord {
        self.counters.failed_extraction += 1;
        FileRecord {
            relative_path,
            absolute_path,
            char_start_offset: None,
            char_end_offset: None,
            char_count: None,
            estimated_tokens: None,
            extraction_status: ExtractionStatus::Error(message),
            encoding_used: None,
        }
    }
}

/// Extract every file in order into one master document. Extraction
/// failures are recorded and skipped; cancellation aborts the whole run.
pub fn aggregate(
    files: &[PathBuf],
    base: &Path,
    tree: &DirectoryTree,
    counter: &dyn TokenCounter,
    options: LineOptions,
    progress: &ProgressSink,
    cancel: &CancelToken,
) -> Result<Aggregation, Cancelled> {
    if let Some(advisory) = options.advisory() {
        warn!("{advisory}");
        progress.message(format!("Warning: {advisory}"));
    }

    let total = files.len();
    let mut master = MasterDocument::with_tree(tree);
    let mut records = Vec::with_capacity(total);
    let mut acc = Accumulator {
        counters: ScanCounters {
            scanned: total,
            ..ScanCounters::default()
        },
        ..Accumulator::default()
    };

    for (idx, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            progress.message("Cancelled.");
            info!("aggregation cancelled before {}", path.display());
            return Err(Cancelled);
        }
        let rel = path
            .strip_prefix(base)
            .map(|p| p.to_slash_lossy().into_owned())
            .unwrap_or_else(|_| path.to_slash_lossy().into_owned());
        let abs = dunce::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();

        match extract::extract(path) {
            Ok(extracted) => {
                let tokens = counter.count(&extracted.text);
                master.push_file(&abs, options.filter(&extracted.text));
                records.push(acc.success(rel, abs.clone(), &extracted, tokens));
                progress.step(format!("Processed {abs} ({tokens} tokens)"), idx + 1, total);
            }
            Err(e) => {
                warn!("extraction failed for {abs}: {e}");
                records.push(acc.failure(rel, abs.clone(), e.to_string()));
                progress.step(format!("Failed {abs}: {e}"), idx + 1, total);
            }
        }
    }

    Ok(Aggregation {
        master,
        records,
        counters: acc.counters,
    })
}
