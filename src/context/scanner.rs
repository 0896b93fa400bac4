use crate::constants::RESERVED_DIR_NAMES;
use crate::context::types::{DirectoryEntry, DirectoryTree, SkipReason};
use crate::error::RunError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use path_slash::PathExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Plain text, source code, structured data and document formats.
const INCLUDE_EXTENSIONS: &[&str] = &[
    // text & docs
    "txt", "md", "rst", "csv", "tsv", "json", "yaml", "yml", "xml", "ini", "cfg", "log", "docx",
    "pdf", "rtf", "env", "conf", "properties",
    // code
    "py", "js", "ts", "java", "c", "cpp", "h", "hpp", "cs", "go", "rb", "sh", "bat", "ps1", "toml",
    "html", "htm", "css", "scss", "less", "php", "pl", "swift", "kt", "rs", "m", "scala", "vb",
    "dart", "sql", "r", "jl", "lua", "asm", "ipynb",
];

/// Binary, media, archive and container formats. Wins over the include list.
const EXCLUDE_EXTENSIONS: &[&str] = &[
    "enc", "exe", "dll", "so", "app", "dmg", "pkg", "deb", "rpm", "zip", "gz", "tar", "rar", "7z",
    "bin", "dat", "o", "obj", "a", "lib", "class", "jar", "apk", "ipa", "iso", "img", "pkl", "db",
    "sqlite", "mp3", "wav", "aac", "flac", "ogg", "mp4", "avi", "mov", "mkv", "wmv", "jpg", "jpeg",
    "png", "gif", "bmp", "tiff", "ico", "svg", "bz2", "xz",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Eligible,
    Excluded,
    NotPlaintext,
}

/// Classify a file by its lowercase extension.
pub fn classify(path: &Path) -> FileClass {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if EXCLUDE_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Excluded
    } else if INCLUDE_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Eligible
    } else {
        FileClass::NotPlaintext
    }
}

pub fn is_reserved_dir(name: &str) -> bool {
    RESERVED_DIR_NAMES.contains(&name)
}

/// Scan policy on top of the fixed extension rules.
#[derive(Debug, Clone, Default)]
pub struct ScanPolicy {
    exclude: Option<GlobSet>,
    output_dir: Option<PathBuf>,
}

impl ScanPolicy {
    /// Compile user exclude globs. Invalid patterns are warned about and
    /// dropped; if none of them compile the policy is rejected.
    pub fn with_excludes(patterns: &[String]) -> Result<Self, RunError> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let mut builder = GlobSetBuilder::new();
        let mut valid = 0usize;
        for pattern in patterns {
            let pattern = pattern.replace('\\', "/");
            match Glob::new(&pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    valid += 1;
                }
                Err(e) => warn!("invalid --exclude pattern: {pattern} ({e})"),
            }
        }
        if valid == 0 {
            return Err(RunError::InvalidConfig(format!(
                "every --exclude pattern was invalid: {patterns:?}"
            )));
        }
        let set = builder
            .build()
            .map_err(|e| RunError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            exclude: Some(set),
            output_dir: None,
        })
    }

    /// Keep the run's own output base out of the scan when it lives under
    /// the input root. `dir` must be canonical.
    pub fn with_output_dir(
        mut self,
        dir: impl Into<PathBuf>,
    ) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    fn is_excluded(
        &self,
        rel: &str,
    ) -> bool {
        self.exclude.as_ref().is_some_and(|set| set.is_match(rel))
    }

    fn is_output_dir(
        &self,
        path: &Path,
    ) -> bool {
        self.output_dir.as_deref() == Some(path)
    }

    /// Whether the directory at `path` is listed but never read.
    fn blocks(
        &self,
        root: &Path,
        path: &Path,
    ) -> bool {
        if path == root {
            return false;
        }
        if path
            .file_name()
            .is_some_and(|name| is_reserved_dir(&name.to_string_lossy()))
            || self.is_output_dir(path)
        {
            return true;
        }
        relative_slash(root, path).is_some_and(|rel| self.is_excluded(&rel))
    }
}

/// Result of scanning a root directory.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub files: Vec<PathBuf>,
    pub tree: DirectoryTree,
}

/// Depth-first, name-sorted scan of `root`. Symlinks are never followed and
/// per-entry I/O errors are recorded in the tree instead of failing the scan.
pub fn scan(
    root: &Path,
    policy: &ScanPolicy,
) -> Scan {
    let filter_root = root.to_path_buf();
    let filter_policy = policy.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        // skipped directories are listed but their contents never yielded
        .filter_entry(move |entry| {
            entry.depth() == 0
                || !entry
                    .path()
                    .parent()
                    .is_some_and(|parent| filter_policy.blocks(&filter_root, parent))
        })
        .build();

    let mut scan = Scan::default();
    for result in walker {
        match result {
            Ok(entry) if entry.depth() == 0 => {}
            Ok(entry) => {
                let path = entry.path();
                let Some(rel) = relative_slash(root, path) else {
                    continue;
                };
                let node = decide(&entry, &rel, policy);
                debug!(path = %rel, processed = node.is_processed(), "scan entry");
                if node.is_processed() && !node.is_dir {
                    scan.files.push(path.to_path_buf());
                }
                insert(&mut scan.tree.entries, &rel, node);
            }
            Err(err) => {
                let Some(path) = error_path(&err) else {
                    warn!("could not read entry under {}: {err}", root.display());
                    continue;
                };
                // reading a skipped directory is not an error worth recording
                if policy.blocks(root, path)
                    || path.parent().is_some_and(|p| policy.blocks(root, p))
                {
                    debug!("ignoring walk error inside skipped directory: {err}");
                    continue;
                }
                warn!("could not read entry under {}: {err}", root.display());
                if let Some(rel) = relative_slash(root, path).filter(|r| !r.is_empty()) {
                    let name = rel.rsplit('/').next().unwrap_or(&rel).to_string();
                    let node = DirectoryEntry::skipped(
                        name,
                        path.is_dir(),
                        SkipReason::Unreadable(io_message(&err)),
                    );
                    insert(&mut scan.tree.entries, &rel, node);
                }
            }
        }
    }
    scan
}

fn decide(
    entry: &ignore::DirEntry,
    rel: &str,
    policy: &ScanPolicy,
) -> DirectoryEntry {
    let name = entry.file_name().to_string_lossy().to_string();
    let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
    if entry.path_is_symlink() {
        return DirectoryEntry::skipped(name, false, SkipReason::Symlink);
    }
    if is_dir && is_reserved_dir(&name) {
        return DirectoryEntry::skipped(name, true, SkipReason::ReservedDirectory);
    }
    if is_dir && policy.is_output_dir(entry.path()) {
        return DirectoryEntry::skipped(name, true, SkipReason::OutputDirectory);
    }
    if policy.is_excluded(rel) {
        return DirectoryEntry::skipped(name, is_dir, SkipReason::ExcludedByPattern);
    }
    if is_dir {
        return DirectoryEntry::processed(name, rel, true);
    }
    match classify(entry.path()) {
        FileClass::Eligible => DirectoryEntry::processed(name, rel, false),
        FileClass::Excluded => DirectoryEntry::skipped(name, false, SkipReason::ExcludedExtension),
        FileClass::NotPlaintext => DirectoryEntry::skipped(name, false, SkipReason::NotPlaintext),
    }
}

/// Place `node` at `rel` in the tree. Parents arrive before children, so the
/// parent is found by walking from the most recent sibling backwards.
fn insert(
    entries: &mut Vec<DirectoryEntry>,
    rel: &str,
    node: DirectoryEntry,
) {
    let mut level = entries;
    let mut parts = rel.split('/').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            // an unreadable directory replaces its own earlier listing
            match level.iter().rposition(|e| e.name == part) {
                Some(idx) => level[idx] = node,
                None => level.push(node),
            }
            return;
        }
        match level.iter().rposition(|e| e.name == part) {
            Some(idx) => level = &mut level[idx].children,
            None => return,
        }
    }
}

fn relative_slash(
    root: &Path,
    path: &Path,
) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_slash_lossy().into_owned())
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}

fn io_message(err: &ignore::Error) -> String {
    match err.io_error() {
        Some(io) => io.to_string(),
        None => err.to_string(),
    }
}

/// Scan for a single-file input: the file is the only eligible entry.
pub fn scan_single_file(path: &Path) -> Scan {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Scan {
        files: vec![path.to_path_buf()],
        tree: DirectoryTree {
            entries: vec![DirectoryEntry::processed(name.clone(), name, false)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_wins_over_inclusion() {
        assert_eq!(classify(Path::new("a.PNG")), FileClass::Excluded);
        assert_eq!(classify(Path::new("a.rs")), FileClass::Eligible);
        assert_eq!(classify(Path::new("a.Md")), FileClass::Eligible);
        assert_eq!(classify(Path::new("a.weird")), FileClass::NotPlaintext);
        assert_eq!(classify(Path::new("Makefile")), FileClass::NotPlaintext);
        for ext in EXCLUDE_EXTENSIONS {
            assert!(!INCLUDE_EXTENSIONS.contains(ext), "{ext} in both lists");
        }
    }

    #[test]
    fn all_invalid_excludes_are_rejected() {
        assert!(ScanPolicy::with_excludes(&["[".to_string()]).is_err());
        let policy = ScanPolicy::with_excludes(&["[".to_string(), "src/**".to_string()]).unwrap();
        assert!(policy.is_excluded("src/a.rs"));
        assert!(!policy.is_excluded("b.rs"));
    }

    #[test]
    fn blocks_skipped_directories_only() {
        let root = Path::new("/in");
        let policy = ScanPolicy::with_excludes(&["build".to_string()])
            .unwrap()
            .with_output_dir("/in/out");
        assert!(!policy.blocks(root, root));
        assert!(policy.blocks(root, Path::new("/in/out")));
        assert!(policy.blocks(root, Path::new("/in/build")));
        assert!(policy.blocks(root, Path::new("/in/pkg/.git")));
        assert!(!policy.blocks(root, Path::new("/in/src")));
        assert!(!policy.blocks(root, Path::new("/in/output")));
    }

    #[test]
    fn insert_nests_under_existing_parent() {
        let mut entries = Vec::new();
        insert(&mut entries, "a", DirectoryEntry::processed("a", "a", true));
        insert(&mut entries, "a/b.txt", DirectoryEntry::processed("b.txt", "a/b.txt", false));
        insert(&mut entries, "c.txt", DirectoryEntry::processed("c.txt", "c.txt", false));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].children[0].name, "b.txt");
    }

    #[test]
    fn single_file_tree() {
        let scan = scan_single_file(Path::new("/tmp/notes.txt"));
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.tree.entries[0].name, "notes.txt");
        assert!(scan.tree.entries[0].is_processed());
    }
}
