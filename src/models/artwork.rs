//! Processed artwork cached per source URL.

use serde::Serialize;

/// Decoded and resized artwork ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artwork {
    /// Encoded image bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

impl Artwork {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            width,
            height,
        }
    }

    /// Size of the encoded image in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
