pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod progress;
pub mod tokenizer;

// Re-export the stage modules at the crate root
pub use context::aggregate;
pub use context::chunker;
pub use context::extract;
pub use context::manifest;
pub use context::scanner;

pub use config::Config;
pub use error::RunError;
pub use pipeline::{Pipeline, RunOutcome, RunSummary};
pub use progress::{CancelToken, ProgressEvent, ProgressSink};
pub use tokenizer::{TokenCounter, Tokenizer};
