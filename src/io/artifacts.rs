use crate::error::RunError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write each line followed by a newline.
pub fn write_lines(
    path: &Path,
    lines: &[String],
) -> Result<(), RunError> {
    let fail = |e| RunError::artifact(path, e);
    let mut out = BufWriter::new(File::create(path).map_err(fail)?);
    for line in lines {
        out.write_all(line.as_bytes()).map_err(fail)?;
        out.write_all(b"\n").map_err(fail)?;
    }
    out.flush().map_err(fail)
}

pub fn write_text(
    path: &Path,
    text: &str,
) -> Result<(), RunError> {
    std::fs::write(path, text).map_err(|e| RunError::artifact(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_newline_terminated() {
        let fp = std::env::temp_dir().join("tokencook_lines.txt");
        write_lines(&fp, &["a".to_string(), String::new(), "b".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&fp).unwrap(), "a\n\nb\n");
        let _ = std::fs::remove_file(&fp);
    }

    #[test]
    fn missing_directory_is_output_error() {
        let err = write_text(Path::new("/definitely/not/here.txt"), "x").unwrap_err();
        assert_eq!(err.category(), "output");
    }
}
