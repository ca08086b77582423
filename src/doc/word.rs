use std::path::Path;

use log::warn;

use super::{backend::DocumentBackend, ReaderError};

/// Word-family adapter backed by docx-lite.
///
/// DOCX carries no page model, so the whole document is extracted eagerly at
/// open and "pages" are simulated by splitting the blob on newlines: page i
/// is line i. Out-of-range indices degrade to empty text with a diagnostic,
/// they never fail.
#[derive(Debug)]
pub struct WordBackend {
    lines: Vec<String>,
}

impl WordBackend {
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        let blob = docx_lite::extract_text(path)
            .map_err(|err| ReaderError::Open(path.to_path_buf(), err.to_string()))?;
        Ok(Self::from_blob(&blob))
    }

    pub fn from_blob(blob: &str) -> Self {
        Self {
            lines: blob.split('\n').map(str::to_string).collect(),
        }
    }
}

impl DocumentBackend for WordBackend {
    fn supports_paged_access(&self) -> bool {
        true
    }

    fn page_count(&self) -> usize {
        self.lines.len()
    }

    fn extract_page(&self, index: usize) -> Result<String, ReaderError> {
        match self.lines.get(index) {
            Some(line) => Ok(line.clone()),
            None => {
                warn!(
                    "line {index} is past the end of the document ({} lines), returning empty text",
                    self.lines.len()
                );
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_lines() {
        let backend = WordBackend::from_blob("uno\ndos\ntres");
        assert_eq!(backend.page_count(), 3);
        assert_eq!(backend.extract_page(1).unwrap(), "dos");
    }

    #[test]
    fn out_of_range_degrades_to_empty() {
        let backend = WordBackend::from_blob("solo una linea");
        assert_eq!(backend.extract_page(7).unwrap(), "");
    }

    #[test]
    fn missing_file_fails_to_open() {
        let err = WordBackend::open(Path::new("/no/such/file.docx")).unwrap_err();
        assert!(matches!(err, ReaderError::Open(_, _)));
    }
}
