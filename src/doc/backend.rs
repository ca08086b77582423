use super::ReaderError;

/// Capability interface implemented by every format adapter.
///
/// Formats without true pagination still implement this trait, but make
/// their synthetic page model explicit: the Word adapter addresses lines,
/// the plain-text and HTML adapters expose their whole content as page 0.
/// `supports_paged_access` tells the two groups apart.
pub trait DocumentBackend: Send {
    fn supports_paged_access(&self) -> bool;

    fn page_count(&self) -> usize;

    fn extract_page(&self, index: usize) -> Result<String, ReaderError>;
}
