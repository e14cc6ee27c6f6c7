use std::path::Path;

use anyhow::{Context, Result};

/// Read a raw transcript file, stripping a UTF-8 BOM if present and
/// normalizing Windows line endings. Zoom saves `.txt` chat logs with
/// either convention depending on the host platform.
pub fn read_transcript_file(path: &Path) -> Result<String> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    Ok(content.replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_strips_bom_and_crlf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}09:00:01 From A to Everyone: hi\r\nline two\r\n").unwrap();

        let content = read_transcript_file(file.path()).unwrap();
        assert!(content.starts_with("09:00:01"));
        assert!(!content.contains('\r'));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = read_transcript_file(Path::new("/nonexistent/chat.txt"));
        assert!(result.is_err());
    }
}
