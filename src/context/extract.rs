//! Text extraction, dispatched by file extension.

use std::fs;
use std::panic;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Plain text extraction failed: {0}")]
    PlainText(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("No text extracted.")]
    Empty,
}

/// Text pulled out of one file plus the encoding the extractor reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub encoding: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    PlainText,
    Pdf,
    Docx,
}

/// Extensions with a dedicated extractor; anything else is read as text.
const REGISTRY: &[(&str, Extractor)] = &[
    ("pdf", Extractor::Pdf),
    ("docx", Extractor::Docx),
];

impl Extractor {
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        REGISTRY
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, kind)| *kind)
            .unwrap_or(Extractor::PlainText)
    }

    pub fn extract(
        self,
        path: &Path,
    ) -> Result<Extracted, ExtractionError> {
        let extracted = match self {
            Extractor::PlainText => read_plain_text(path)?,
            Extractor::Pdf => read_pdf(path)?,
            Extractor::Docx => read_docx(path)?,
        };
        if extracted.text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(extracted)
    }
}

/// Extract the text of `path` with the extractor registered for its extension.
pub fn extract(path: &Path) -> Result<Extracted, ExtractionError> {
    Extractor::for_path(path).extract(path)
}

fn read_plain_text(path: &Path) -> Result<Extracted, ExtractionError> {
    let bytes = fs::read(path).map_err(|e| ExtractionError::PlainText(e.to_string()))?;
    // invalid sequences become U+FFFD
    Ok(match String::from_utf8(bytes) {
        Ok(text) => Extracted {
            text,
            encoding: "utf-8",
        },
        Err(e) => Extracted {
            text: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            encoding: "utf-8-lossy",
        },
    })
}

fn read_pdf(path: &Path) -> Result<Extracted, ExtractionError> {
    let owned = path.to_path_buf();
    // pdf-extract can panic on malformed documents
    let result = panic::catch_unwind(move || pdf_extract::extract_text(&owned));
    match result {
        Ok(Ok(text)) => Ok(Extracted {
            text,
            encoding: "utf-8",
        }),
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => Err(ExtractionError::Pdf(
            "parser panicked on malformed document".to_string(),
        )),
    }
}

fn read_docx(path: &Path) -> Result<Extracted, ExtractionError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let bytes = fs::read(path).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| ExtractionError::Docx(format!("{e:?}")))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            let mut text = String::new();
            for para_child in &para.children {
                if let ParagraphChild::Run(run) = para_child {
                    for run_child in &run.children {
                        if let RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }
    Ok(Extracted {
        text: paragraphs.join("\n"),
        encoding: "utf-8",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn dispatch_is_case_insensitive_with_text_fallback() {
        assert_eq!(Extractor::for_path(Path::new("a.PDF")), Extractor::Pdf);
        assert_eq!(Extractor::for_path(Path::new("a.docx")), Extractor::Docx);
        assert_eq!(Extractor::for_path(Path::new("a.rs")), Extractor::PlainText);
        assert_eq!(Extractor::for_path(Path::new("README")), Extractor::PlainText);
    }

    #[test]
    fn whitespace_only_is_an_error() {
        let fp = env::temp_dir().join("tokencook_blank.txt");
        fs::write(&fp, "  \n\t\n").unwrap();
        assert_eq!(extract(&fp), Err(ExtractionError::Empty));
        let _ = fs::remove_file(&fp);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let fp = env::temp_dir().join("tokencook_lossy.txt");
        fs::write(&fp, [b'o', b'k', 0xff, b'\n']).unwrap();
        let got = extract(&fp).unwrap();
        assert_eq!(got.text, "ok\u{FFFD}\n");
        assert_eq!(got.encoding, "utf-8-lossy");
        let _ = fs::remove_file(&fp);
    }

    #[test]
    fn missing_file_is_typed_error() {
        let err = extract(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ExtractionError::PlainText(_)));
        assert!(err.to_string().starts_with("Plain text extraction failed"));
    }

    #[test]
    fn docx_paragraphs_are_joined_by_newline() {
        use docx_rs::{Docx, Paragraph, Run};

        let fp = env::temp_dir().join("tokencook_real.docx");
        let file = fs::File::create(&fp).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("hello")))
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("sec"))
                    .add_run(Run::new().add_text("ond")),
            )
            .build()
            .pack(file)
            .unwrap();

        let got = extract(&fp).unwrap();
        assert_eq!(got.text, "hello\nsecond");
        assert_eq!(got.encoding, "utf-8");
        let _ = fs::remove_file(&fp);
    }

    #[test]
    fn single_paragraph_docx_is_its_text() {
        use docx_rs::{Docx, Paragraph, Run};

        let fp = env::temp_dir().join("tokencook_hello.docx");
        let file = fs::File::create(&fp).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("hello")))
            .build()
            .pack(file)
            .unwrap();
        assert_eq!(extract(&fp).unwrap().text, "hello");
        let _ = fs::remove_file(&fp);
    }

    #[test]
    fn garbage_pdf_and_docx_fail_cleanly() {
        let dir = env::temp_dir();
        let pdf = dir.join("tokencook_garbage.pdf");
        let docx = dir.join("tokencook_garbage.docx");
        fs::write(&pdf, b"not a pdf at all").unwrap();
        fs::write(&docx, b"not a zip either").unwrap();
        assert!(matches!(extract(&pdf), Err(ExtractionError::Pdf(_))));
        assert!(matches!(extract(&docx), Err(ExtractionError::Docx(_))));
        let _ = fs::remove_file(&pdf);
        let _ = fs::remove_file(&docx);
    }
}
