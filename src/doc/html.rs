use std::fs;
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::{backend::DocumentBackend, ReaderError};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// HTML adapter with single-page semantics: the file is parsed at open,
/// markup is stripped, and the remaining text is exposed in full as page 0.
pub struct HtmlBackend {
    content: String,
}

impl HtmlBackend {
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| ReaderError::Open(path.to_path_buf(), err.to_string()))?;
        Ok(Self {
            content: strip_markup(&raw),
        })
    }
}

/// Drops tags and collapses the whitespace runs they leave behind.
pub fn strip_markup(html: &str) -> String {
    let document = Html::parse_document(html);
    let fragments: Vec<&str> = document.root_element().text().collect();
    WHITESPACE
        .replace_all(fragments.join(" ").trim(), " ")
        .into_owned()
}

impl DocumentBackend for HtmlBackend {
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
            debug!("stripped HTML has a single page, index {index} is empty");
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn strips_tags_and_keeps_text() {
        let text = strip_markup("<html><body><h1>Hola</h1><p>mundo <b>real</b></p></body></html>");
        assert_eq!(text, "Hola mundo real");
    }

    #[test]
    fn collapses_whitespace_between_elements() {
        let text = strip_markup("<p>uno</p>\n\n   <p>dos</p>");
        assert_eq!(text, "uno dos");
    }

    #[test]
    fn opens_file_and_exposes_single_page() {
        let mut tmp = Builder::new().suffix(".html").tempfile().unwrap();
        write!(tmp, "<html><body><p>texto visible</p></body></html>").unwrap();
        let backend = HtmlBackend::open(tmp.path()).unwrap();
        assert_eq!(backend.page_count(), 1);
        assert_eq!(backend.extract_page(0).unwrap(), "texto visible");
        assert_eq!(backend.extract_page(1).unwrap(), "");
    }
}
