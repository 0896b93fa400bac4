//! Error types for a cook run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal run errors. Per-file extraction failures never show up here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    InvalidConfig(String),

    #[error("input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tokenizer init failed: {0}")]
    Tokenizer(String),
}

impl RunError {
    pub fn output_dir(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::OutputDir {
            path: path.into(),
            source,
        }
    }

    pub fn artifact(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Artifact {
            path: path.into(),
            source,
        }
    }

    /// Short label for one-line error reports.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "config",
            Self::InputNotFound(_) => "input",
            Self::OutputDir { .. } | Self::Artifact { .. } => "output",
            Self::Manifest { .. } => "manifest",
            Self::Tokenizer(_) => "tokenizer",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) => 2,
            Self::InputNotFound(_) => 3,
            Self::OutputDir { .. } | Self::Artifact { .. } | Self::Manifest { .. } => 4,
            Self::Tokenizer(_) => 5,
        }
    }
}

/// Returned by stages that observed the cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("processing was cancelled")]
pub struct Cancelled;

/// Exit code reported when a run is cancelled.
pub const CANCELLED_EXIT_CODE: i32 = 130;
