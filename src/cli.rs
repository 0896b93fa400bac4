use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_ENCODING};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tokencook")]
#[command(
    about = "Extract the text of a file or directory into one document, split it into \
             token-bounded chunks for an LLM context window, and write a manifest."
)]
pub struct Cli {
    /// Input file or directory.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Directory that receives the per-run output subdirectory.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Maximum tokens per chunk; documents at or under this size are not chunked.
    #[arg(short = 'c', long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Also write the unchunked master file when chunking happens.
    #[arg(short = 'k', long = "keep-masterfile")]
    pub keep_masterfile: bool,

    /// Prefix every kept line with its line number in the source file.
    #[arg(short = 'n', long = "line-numbers")]
    pub line_numbers: bool,

    /// Drop blank lines from file contents.
    #[arg(short = 'e', long = "skip-empty-lines")]
    pub skip_empty_lines: bool,

    /// Glob patterns (relative to the input root) to leave out of the scan.
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// tiktoken encoding used to count tokens.
    #[arg(long = "encoding", default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Do not print progress messages.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}
