//! Engine-facing types.
//!
//! A recognizer hands back everything the merger needs in one bundle:
//! word texts with confidences, per-symbol boxes in reading order, and the
//! engine's own line rendition of the page.

use crate::Rect;

#[derive(Debug, Clone)]
pub struct RawWord {
    pub text: String,
    /// Percent scale, 0 to 100.
    pub confidence: i32,
}

/// Raw recognition output for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameRecognition {
    pub words: Vec<RawWord>,
    /// One box per recognized symbol, in the same order the words run.
    pub symbols: Vec<Rect>,
    /// The engine's line strings, used to group words back into lines.
    pub lines: Vec<String>,
}

pub trait TextRecognizer {
    fn recognize(&mut self, image: &image::DynamicImage) -> anyhow::Result<FrameRecognition>;
}
