use std::path::Path;

use log::{debug, info};
use lopdf::{Document, Object};

use super::{backend::DocumentBackend, ReaderError};

/// Paginated PDF adapter backed by lopdf.
///
/// The only adapter with true random-access page semantics. Out-of-range
/// indices surface as [`ReaderError::PageOutOfRange`] instead of degrading
/// to empty text.
#[derive(Debug)]
pub struct PdfBackend {
    document: Document,
    page_numbers: Vec<u32>,
}

impl PdfBackend {
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        let document = Document::load(path)
            .map_err(|err| ReaderError::Open(path.to_path_buf(), err.to_string()))?;
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        log_metadata(&document, path, page_numbers.len());
        Ok(Self {
            document,
            page_numbers,
        })
    }
}

impl DocumentBackend for PdfBackend {
    fn supports_paged_access(&self) -> bool {
        true
    }

    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn extract_page(&self, index: usize) -> Result<String, ReaderError> {
        let page_number = self
            .page_numbers
            .get(index)
            .copied()
            .ok_or(ReaderError::PageOutOfRange(index, self.page_numbers.len()))?;
        self.document
            .extract_text(&[page_number])
            .map_err(|err| ReaderError::Extract(index, err.to_string()))
    }
}

/// Best-effort read of the trailer Info dictionary for open diagnostics.
fn log_metadata(document: &Document, path: &Path, pages: usize) {
    let info = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| document.get_object(id).ok());

    let Some(Object::Dictionary(info_dict)) = info else {
        debug!("no Info dictionary in {}", path.display());
        info!("opened PDF {} with {pages} pages", path.display());
        return;
    };

    let get_string = |key: &[u8]| -> Option<String> {
        info_dict.get(key).ok().and_then(|obj| match obj {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
    };

    match (get_string(b"Title"), get_string(b"Author")) {
        (Some(title), Some(author)) => info!(
            "opened PDF {} with {pages} pages (\"{title}\" by {author})",
            path.display()
        ),
        (Some(title), None) => {
            info!("opened PDF {} with {pages} pages (\"{title}\")", path.display())
        }
        _ => info!("opened PDF {} with {pages} pages", path.display()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::path::Path;

    /// Writes a minimal PDF with one page per entry in `page_texts`.
    pub fn write_pdf(path: &Path, page_texts: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extracts_pages_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("two-pages.pdf");
        fixtures::write_pdf(&path, &["first page", "second page"]);

        let backend = PdfBackend::open(&path).unwrap();
        assert_eq!(backend.page_count(), 2);
        assert!(backend.supports_paged_access());
        assert!(backend.extract_page(0).unwrap().contains("first page"));
        assert!(backend.extract_page(1).unwrap().contains("second page"));
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("one-page.pdf");
        fixtures::write_pdf(&path, &["only page"]);

        let backend = PdfBackend::open(&path).unwrap();
        let err = backend.extract_page(5).unwrap_err();
        assert!(matches!(err, ReaderError::PageOutOfRange(5, 1)));
    }

    #[test]
    fn malformed_file_fails_to_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = PdfBackend::open(&path).unwrap_err();
        assert!(matches!(err, ReaderError::Open(_, _)));
    }
}
