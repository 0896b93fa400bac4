use crate::cli::Cli;
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_ENCODING};
use crate::context::aggregate::LineOptions;
use crate::error::RunError;
use crate::tokenizer::is_known_encoding;
use clap::Parser;
use std::path::PathBuf;

/// Run configuration derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub chunk_size: usize,
    pub keep_masterfile: bool,
    pub line_numbers: bool,
    pub skip_empty_lines: bool,
    pub exclude: Vec<String>,
    pub encoding: String,
    pub quiet: bool,
}

impl Config {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Config {
            input: input.into(),
            output: output.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            keep_masterfile: false,
            line_numbers: false,
            skip_empty_lines: false,
            exclude: Vec::new(),
            encoding: DEFAULT_ENCODING.to_string(),
            quiet: false,
        }
    }

    /// Parse CLI arguments into a Config
    pub fn from_cli() -> Self {
        Self::from(Cli::parse())
    }

    pub fn validate(&self) -> Result<(), RunError> {
        if self.chunk_size == 0 {
            return Err(RunError::InvalidConfig(
                "--chunk-size must be at least 1".to_string(),
            ));
        }
        if !is_known_encoding(&self.encoding) {
            return Err(RunError::InvalidConfig(format!(
                "unknown token encoding: {}",
                self.encoding
            )));
        }
        Ok(())
    }

    pub fn line_options(&self) -> LineOptions {
        LineOptions {
            line_numbers: self.line_numbers,
            skip_empty_lines: self.skip_empty_lines,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            input: cli.input,
            output: cli.output,
            chunk_size: cli.chunk_size,
            keep_masterfile: cli.keep_masterfile,
            line_numbers: cli.line_numbers,
            skip_empty_lines: cli.skip_empty_lines,
            exclude: cli.exclude,
            encoding: cli.encoding,
            quiet: cli.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["tokencook", "-i", "in", "-o", "out"]).unwrap();
        let cfg = Config::from(cli);
        assert_eq!(cfg, Config::new("in", "out"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut cfg = Config::new("in", "out");
        cfg.chunk_size = 0;
        assert_eq!(cfg.validate().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn flags_map_to_line_options() {
        let cli = Cli::try_parse_from(["tokencook", "-i", "in", "-o", "out", "-n", "-e"]).unwrap();
        let opts = Config::from(cli).line_options();
        assert!(opts.line_numbers && opts.skip_empty_lines);
    }
}
