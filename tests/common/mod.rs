#![allow(dead_code)]
use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokencook::{CancelToken, Config, Pipeline, RunOutcome, RunSummary, TokenCounter};

/// One token per whitespace-separated word; exact and deterministic.
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(
        &self,
        text: &str,
    ) -> usize {
        text.split_whitespace().count()
    }
}

/// Word counter that trips a cancel token on its `after`-th call.
pub struct CancellingCounter {
    pub token: CancelToken,
    pub after: usize,
    pub calls: AtomicUsize,
}

impl TokenCounter for CancellingCounter {
    fn count(
        &self,
        text: &str,
    ) -> usize {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
        text.split_whitespace().count()
    }
}

pub fn run(config: &Config) -> RunSummary {
    match Pipeline::new(config, &WordCounter).run().unwrap() {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::Cancelled => panic!("run was cancelled"),
    }
}

pub fn read_manifest(summary: &RunSummary) -> serde_json::Value {
    let text = fs::read_to_string(&summary.manifest_path).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Names of the entries in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Chunk files of a run ordered by index.
pub fn chunk_files(summary: &RunSummary) -> Vec<PathBuf> {
    let mut chunks: Vec<(usize, PathBuf)> = file_names(&summary.output_dir)
        .into_iter()
        .filter(|n| n.starts_with("chunk_"))
        .map(|n| {
            let idx = n
                .trim_start_matches("chunk_")
                .split('_')
                .next()
                .unwrap()
                .parse()
                .unwrap();
            (idx, summary.output_dir.join(n))
        })
        .collect();
    chunks.sort();
    chunks.into_iter().map(|(_, p)| p).collect()
}

/// Body lines of a chunk file, markers stripped.
pub fn chunk_body(path: &Path) -> Vec<String> {
    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    assert!(lines.len() >= 2, "chunk without markers: {}", path.display());
    assert_eq!(lines[0], lines[lines.len() - 1], "header and trailer differ");
    lines[1..lines.len() - 1].to_vec()
}

/// Builds a fixture tree:
/// root/
///   README.md
///   src/lib.rs
///   src/notes.txt
///   assets/logo.png   (excluded extension)
///   build.weird       (not plaintext)
///   .venv/secret.py   (reserved directory)
pub fn basic_fs() -> TempDir {
    let td = TempDir::new().unwrap();
    for dir in ["src", "assets", ".venv"] {
        td.child(dir).create_dir_all().unwrap();
    }
    td.child("README.md").write_str("# readme\nhello there\n").unwrap();
    td.child("src/lib.rs")
        .write_str("pub fn answer() -> u32 {\n    42\n}\n")
        .unwrap();
    td.child("src/notes.txt").write_str("first note\nsecond note\n").unwrap();
    td.child("assets/logo.png").write_binary(&[0x89, b'P', b'N', b'G']).unwrap();
    td.child("build.weird").write_str("???").unwrap();
    td.child(".venv/secret.py").write_str("TOKEN = 'x'\n").unwrap();
    td
}

/// `count` files named f00.txt.. each with `lines` lines of `words` words.
pub fn wordy_fs(
    count: usize,
    lines: usize,
    words: usize,
) -> TempDir {
    let td = TempDir::new().unwrap();
    let line = vec!["tok"; words].join(" ");
    let body = format!("{line}\n").repeat(lines);
    for i in 0..count {
        td.child(format!("f{i:02}.txt")).write_str(&body).unwrap();
    }
    td
}
