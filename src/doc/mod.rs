//! Uniform page-indexed text extraction over heterogeneous document formats.
//!
//! [`DocumentReader::open`] never fails structurally: every open failure is
//! caught, logged and recorded, leaving an inert reader whose reads degrade
//! to empty text. The one deliberate exception to the degrade-everything
//! policy is direct PDF page access, where an out-of-range index is a typed
//! error the caller can act on.

pub mod backend;
pub mod html;
pub mod pdf;
pub mod text;
pub mod word;

use std::path::{Path, PathBuf};

use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

use backend::DocumentBackend;

/// Separator between page segments in a joined extraction payload.
const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open {0}: {1}")]
    Open(PathBuf, String),
    #[error("page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),
    #[error("failed to extract text from page {0}: {1}")]
    Extract(usize, String),
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
    #[error("document has been closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Pdf,
    Word,
    PlainText,
    Html,
    Unsupported,
}

impl DocFormat {
    /// Derives the format tag from the path extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" | "doc" => Self::Word,
            "txt" => Self::PlainText,
            "html" | "htm" => Self::Html,
            _ => Self::Unsupported,
        }
    }
}

/// Which pages of a document an extraction request covers.
///
/// Indices are zero-based and need not be contiguous or sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page the backend reports, in order.
    All,
    Pages(Vec<usize>),
}

impl PageSelection {
    pub fn resolve(&self, reader: &DocumentReader) -> Vec<usize> {
        match self {
            Self::All => (0..reader.page_count()).collect(),
            Self::Pages(indices) => indices.clone(),
        }
    }
}

/// Per-page progress notification emitted by [`DocumentReader::read_pages`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadProgress {
    pub processed: usize,
    pub total: usize,
    pub percent: f64,
}

/// What happened to a single requested page during a batch read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PageOutcome {
    Extracted,
    Empty,
    Failed { reason: String },
}

/// Result of a batch read: the joined narration payload plus the per-page
/// outcomes that distinguish "page was empty" from "page read failed".
#[derive(Debug, Serialize)]
pub struct Extraction {
    pub text: String,
    pub outcomes: Vec<PageOutcome>,
}

pub struct DocumentReader {
    path: PathBuf,
    format: DocFormat,
    backend: Option<Box<dyn DocumentBackend>>,
    open_error: Option<ReaderError>,
    closed: bool,
}

impl DocumentReader {
    /// Opens `path`, dispatching on the extension-derived format.
    ///
    /// Never fails: a missing file, a malformed document or an unknown
    /// extension all produce an inert reader with [`Self::open_error`] set.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = DocFormat::from_path(&path);

        let opened: Result<Box<dyn DocumentBackend>, ReaderError> = match format {
            DocFormat::Pdf => pdf::PdfBackend::open(&path).map(|b| Box::new(b) as _),
            DocFormat::Word => word::WordBackend::open(&path).map(|b| Box::new(b) as _),
            DocFormat::PlainText => text::TextBackend::open(&path).map(|b| Box::new(b) as _),
            DocFormat::Html => html::HtmlBackend::open(&path).map(|b| Box::new(b) as _),
            DocFormat::Unsupported => Err(ReaderError::UnsupportedFormat(
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("none")
                    .to_string(),
            )),
        };

        let (backend, open_error) = match opened {
            Ok(backend) => (Some(backend), None),
            Err(err) => {
                error!("failed to open {}: {err}", path.display());
                (None, Some(err))
            }
        };

        Self {
            path,
            format,
            backend,
            open_error,
            closed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocFormat {
        self.format
    }

    /// True when the document opened and has not been closed.
    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    pub fn open_error(&self) -> Option<&ReaderError> {
        self.open_error.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.backend.as_ref().map_or(0, |b| b.page_count())
    }

    /// Reads the text of one page.
    ///
    /// Only direct PDF access propagates errors (out-of-range or extraction
    /// failure); every other state degrades to empty text with a diagnostic.
    pub fn read_page(&self, index: usize) -> Result<String, ReaderError> {
        if self.closed && self.format == DocFormat::Pdf {
            return Err(ReaderError::Closed);
        }
        match &self.backend {
            Some(backend) => backend.extract_page(index),
            None => {
                warn!(
                    "{} has no readable content, page {index} is empty",
                    self.path.display()
                );
                Ok(String::new())
            }
        }
    }

    /// Reads many pages, tolerating per-page failures.
    ///
    /// Each index is read in order; a failing page is logged, recorded in the
    /// outcomes and contributes an empty segment, it never aborts the batch.
    /// After every page, `progress` receives a notification whose percentage
    /// climbs monotonically to 100. Segments are joined with a blank line and
    /// the output always has exactly one segment per requested index.
    pub fn read_pages<F>(&self, indices: &[usize], mut progress: F) -> Extraction
    where
        F: FnMut(ReadProgress),
    {
        let total = indices.len();
        let mut segments = Vec::with_capacity(total);
        let mut outcomes = Vec::with_capacity(total);

        for (processed, &index) in indices.iter().enumerate() {
            match self.read_page(index) {
                Ok(text) => {
                    outcomes.push(if text.is_empty() {
                        PageOutcome::Empty
                    } else {
                        PageOutcome::Extracted
                    });
                    segments.push(text);
                }
                Err(err) => {
                    warn!("failed to read page {index}: {err}");
                    outcomes.push(PageOutcome::Failed {
                        reason: err.to_string(),
                    });
                    segments.push(String::new());
                }
            }
            progress(ReadProgress {
                processed: processed + 1,
                total,
                percent: (processed + 1) as f64 / total as f64 * 100.0,
            });
        }

        Extraction {
            text: segments.join(PAGE_SEPARATOR),
            outcomes,
        }
    }

    /// Releases the paginated handle for PDF documents.
    ///
    /// A no-op for formats that loaded their content eagerly, and safe to
    /// call on a reader whose open failed.
    pub fn close(&mut self) {
        if self.format == DocFormat::Pdf {
            self.backend = None;
        }
        self.closed = true;
    }
}
