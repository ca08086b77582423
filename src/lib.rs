//! Document narration: uniform text extraction over heterogeneous document
//! formats, speech synthesis through an external engine, and background
//! playback with pause/resume/stop control.
//!
//! The two halves are [`doc::DocumentReader`], which normalizes page-indexed
//! access to PDF, Word, plain-text and HTML files, and
//! [`narrate::NarrationController`], which turns extracted text into audio
//! and drives a [`playback::PlaybackSession`] while the caller keeps the
//! transport controls.

pub mod audio;
pub mod doc;
pub mod narrate;
pub mod playback;
pub mod synth;
pub mod util;

pub use doc::{DocFormat, DocumentReader, PageSelection};
pub use narrate::{NarrationController, OutputFormat};
pub use playback::PlaybackState;
