use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// Why a scanned entry was not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Symlink,
    ExcludedExtension,
    NotPlaintext,
    ReservedDirectory,
    ExcludedByPattern,
    OutputDirectory,
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Symlink => f.write_str("symlink"),
            Self::ExcludedExtension => f.write_str("explicitly_excluded"),
            Self::NotPlaintext => f.write_str("not_plaintext"),
            Self::ReservedDirectory => f.write_str("reserved_directory"),
            Self::ExcludedByPattern => f.write_str("excluded_by_pattern"),
            Self::OutputDirectory => f.write_str("output_directory"),
            Self::Unreadable(why) => write!(f, "unreadable: {why}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Processed { rel_path: String },
    Skipped(SkipReason),
}

/// One node of the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    pub disposition: Disposition,
    /// Children in traversal order; always empty for files and skipped directories.
    pub children: Vec<DirectoryEntry>,
}

impl DirectoryEntry {
    pub fn processed(
        name: impl Into<String>,
        rel_path: impl Into<String>,
        is_dir: bool,
    ) -> Self {
        Self {
            name: name.into(),
            is_dir,
            disposition: Disposition::Processed {
                rel_path: rel_path.into(),
            },
            children: Vec::new(),
        }
    }

    pub fn skipped(
        name: impl Into<String>,
        is_dir: bool,
        reason: SkipReason,
    ) -> Self {
        Self {
            name: name.into(),
            is_dir,
            disposition: Disposition::Skipped(reason),
            children: Vec::new(),
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.disposition, Disposition::Processed { .. })
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.disposition {
            Disposition::Skipped(reason) => Some(reason),
            Disposition::Processed { .. } => None,
        }
    }
}

impl Serialize for DirectoryEntry {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("processed", &self.is_processed())?;
        match &self.disposition {
            Disposition::Processed { rel_path } => map.serialize_entry("rel_path", rel_path)?,
            Disposition::Skipped(reason) => map.serialize_entry("skipped", &reason.to_string())?,
        }
        if self.is_dir && self.is_processed() {
            map.serialize_entry("children", &Children(&self.children))?;
        }
        map.end()
    }
}

/// Serializes a child list as an object keyed by name, keeping order.
struct Children<'a>(&'a [DirectoryEntry]);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for child in self.0 {
            map.serialize_entry(&child.name, child)?;
        }
        map.end()
    }
}

/// Top-level entries under the input root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTree {
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryTree {
    /// Depth-first walk over every node.
    pub fn walk(&self) -> Vec<(usize, &DirectoryEntry)> {
        fn visit<'a>(
            entries: &'a [DirectoryEntry],
            depth: usize,
            out: &mut Vec<(usize, &'a DirectoryEntry)>,
        ) {
            for entry in entries {
                out.push((depth, entry));
                visit(&entry.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.entries, 0, &mut out);
        out
    }

    pub fn count_skipped(
        &self,
        pred: impl Fn(&SkipReason) -> bool,
    ) -> usize {
        self.walk()
            .into_iter()
            .filter(|(_, e)| e.skip_reason().is_some_and(&pred))
            .count()
    }

    /// Text rendering used as the preamble of the master document.
    pub fn render_lines(&self) -> Vec<String> {
        self.walk()
            .into_iter()
            .map(|(depth, entry)| {
                let indent = "  ".repeat(depth);
                match &entry.disposition {
                    Disposition::Processed { .. } if entry.is_dir => {
                        format!("{indent}{}/", entry.name)
                    }
                    Disposition::Processed { rel_path } => format!("{indent}{rel_path}"),
                    Disposition::Skipped(reason) => {
                        format!("{indent}{} (skipped: {reason})", entry.name)
                    }
                }
            })
            .collect()
    }
}

impl Serialize for DirectoryTree {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Children(&self.entries).serialize(serializer)
    }
}

/// Outcome of extracting one eligible file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Success,
    Error(String),
}

impl fmt::Display for ExtractionStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl Serialize for ExtractionStatus {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-file provenance. Offsets address the pre-filter extracted text and
/// are only set for successful extractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub relative_path: String,
    pub absolute_path: String,
    pub char_start_offset: Option<usize>,
    pub char_end_offset: Option<usize>,
    pub char_count: Option<usize>,
    pub estimated_tokens: Option<usize>,
    pub extraction_status: ExtractionStatus,
    pub encoding_used: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanCounters {
    pub scanned: usize,
    pub processed: usize,
    pub skipped_binary: usize,
    pub skipped_symlink: usize,
    pub skipped_other: usize,
    pub failed_extraction: usize,
    pub estimated_tokens: usize,
}

impl ScanCounters {
    /// Fill the skip counters from the scanned tree.
    pub fn with_tree(
        mut self,
        tree: &DirectoryTree,
    ) -> Self {
        self.skipped_binary = tree.count_skipped(|r| {
            matches!(r, SkipReason::ExcludedExtension | SkipReason::NotPlaintext)
        });
        self.skipped_symlink = tree.count_skipped(|r| matches!(r, SkipReason::Symlink));
        self.skipped_other = tree.count_skipped(|r| {
            matches!(
                r,
                SkipReason::ReservedDirectory
                    | SkipReason::ExcludedByPattern
                    | SkipReason::OutputDirectory
                    | SkipReason::Unreadable(_)
            )
        });
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkingSummary {
    pub enabled: bool,
    pub threshold: usize,
    pub created: usize,
}
