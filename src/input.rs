//! Resolution of content and credentials supplied inline or by reference

use crate::error::{Result, SummaryError};
use std::io::Read;
use std::path::PathBuf;

/// Where a piece of text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl TextSource {
    /// Reference form: `-` is stdin, anything else a file path
    pub fn from_reference(reference: &str) -> Self {
        if reference == "-" {
            TextSource::Stdin
        } else {
            TextSource::File(PathBuf::from(reference))
        }
    }

    /// Read the text.
    ///
    /// Referenced sources must be readable and non-empty; inline text is
    /// returned as given.
    pub fn resolve(&self) -> Result<String> {
        let text = match self {
            TextSource::Inline(text) => return Ok(text.clone()),
            TextSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                SummaryError::Input(format!("Failed to read {}: {}", path.display(), e))
            })?,
            TextSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| SummaryError::Input(format!("Failed to read stdin: {}", e)))?;
                buf
            }
        };

        if text.trim().is_empty() {
            return Err(SummaryError::Input(format!("{} is empty", self.describe())));
        }
        Ok(text)
    }

    pub fn describe(&self) -> String {
        match self {
            TextSource::Inline(_) => "inline text".to_string(),
            TextSource::File(path) => path.display().to_string(),
            TextSource::Stdin => "stdin".to_string(),
        }
    }
}

/// Stdin can only be consumed once per run; reject more than one stdin source
pub fn ensure_single_stdin(sources: &[&TextSource]) -> Result<()> {
    let stdin_sources = sources
        .iter()
        .filter(|source| matches!(source, TextSource::Stdin))
        .count();
    if stdin_sources > 1 {
        return Err(SummaryError::Configuration(
            "Only one input may be read from stdin (content and API key both use `-`)"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reference_parsing() {
        assert_eq!(TextSource::from_reference("-"), TextSource::Stdin);
        assert_eq!(
            TextSource::from_reference("notes.txt"),
            TextSource::File(PathBuf::from("notes.txt"))
        );
    }

    #[test]
    fn test_inline_returned_verbatim() {
        let source = TextSource::Inline(String::new());
        assert_eq!(source.resolve().unwrap(), "");
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "line1\nline2").unwrap();
        let source = TextSource::File(file.path().to_path_buf());
        assert_eq!(source.resolve().unwrap(), "line1\nline2");
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = TextSource::File(file.path().to_path_buf());
        assert!(matches!(source.resolve(), Err(SummaryError::Input(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let source = TextSource::File(PathBuf::from("/definitely/not/here.txt"));
        let err = source.resolve().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_single_stdin_source_allowed() {
        let content = TextSource::Stdin;
        let key = TextSource::File(PathBuf::from("key.txt"));
        assert!(ensure_single_stdin(&[&content, &key]).is_ok());
        assert!(ensure_single_stdin(&[&TextSource::Inline("x".to_string())]).is_ok());
    }

    #[test]
    fn test_stdin_for_content_and_key_rejected() {
        let content = TextSource::Stdin;
        let key = TextSource::from_reference("-");
        let err = ensure_single_stdin(&[&content, &key]).unwrap_err();
        assert!(matches!(err, SummaryError::Configuration(_)));
    }
}
