use crate::error::RunError;
use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base, p50k_base, r50k_base};

/// Deterministic text -> token count function shared by every stage of a run.
pub trait TokenCounter: Send + Sync {
    fn count(
        &self,
        text: &str,
    ) -> usize;
}

/// Encoding names accepted by [`Tokenizer::from_encoding`].
pub const KNOWN_ENCODINGS: &[&str] = &["cl100k_base", "o200k_base", "p50k_base", "r50k_base"];

/// tiktoken-backed counter, built once per run and passed by reference.
pub struct Tokenizer {
    bpe: CoreBPE,
}

impl Tokenizer {
    pub fn from_encoding(name: &str) -> Result<Self, RunError> {
        if !is_known_encoding(name) {
            return Err(RunError::InvalidConfig(format!(
                "unknown token encoding: {name} (expected one of {})",
                KNOWN_ENCODINGS.join(", ")
            )));
        }
        let bpe = match name {
            "o200k_base" => o200k_base(),
            "p50k_base" => p50k_base(),
            "r50k_base" => r50k_base(),
            _ => cl100k_base(),
        }
        .map_err(|e| RunError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for Tokenizer {
    #[inline]
    fn count(
        &self,
        text: &str,
    ) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

pub fn is_known_encoding(name: &str) -> bool {
    KNOWN_ENCODINGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_count_is_stable() {
        let tok = Tokenizer::from_encoding("cl100k_base").unwrap();
        assert_eq!(tok.count("hello world"), 2);
        assert_eq!(tok.count(""), 0);
    }

    #[test]
    fn every_known_encoding_builds() {
        for name in KNOWN_ENCODINGS {
            assert!(is_known_encoding(name));
            assert!(Tokenizer::from_encoding(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn unknown_encoding_is_config_error() {
        let err = Tokenizer::from_encoding("gpt-0").err().unwrap();
        assert!(matches!(err, RunError::InvalidConfig(_)), "{err}");
    }
}
