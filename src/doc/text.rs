use std::fs;
use std::path::Path;

use log::debug;

use super::{backend::DocumentBackend, ReaderError};

/// Plain-text adapter with single-page semantics: the file is read eagerly
/// at open and exposed in full as page 0. Any other index is empty.
#[derive(Debug)]
pub struct TextBackend {
    content: String,
}

impl TextBackend {
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        let content = fs::read_to_string(path)
            .map_err(|err| ReaderError::Open(path.to_path_buf(), err.to_string()))?;
        Ok(Self { content })
    }

    pub fn from_content(content: String) -> Self {
        Self { content }
    }
}

impl DocumentBackend for TextBackend {
    fn supports_paged_access(&self) -> bool {
        false
    }

    fn page_count(&self) -> usize {
        1
    }

    fn extract_page(&self, index: usize) -> Result<String, ReaderError> {
        if index == 0 {
            Ok(self.content.clone())
        } else {
            debug!("plain text has a single page, index {index} is empty");
            Ok(String::new())
        }
    }
}
