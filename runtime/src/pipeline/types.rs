use std::path::PathBuf;

use crate::error::ExtractError;

/// The two kinds of document the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Pdf,
    Image,
}

impl MediaKind {
    /// Classify a declared MIME type, ignoring parameters such as `charset`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence == "application/pdf" {
            Some(MediaKind::Pdf)
        } else if essence.starts_with("image/") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Pdf => "pdf",
            MediaKind::Image => "image",
        }
    }
}

/// A document staged on disk for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub content_type: String,
    pub original_name: String,
    pub size: u64,
}

impl UploadedFile {
    pub fn media_kind(&self) -> Result<MediaKind, ExtractError> {
        MediaKind::from_mime(&self.content_type)
            .ok_or_else(|| ExtractError::UnsupportedMediaType(self.content_type.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Extracted(String),
    Failed { reason: String },
}

impl ExtractionResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Extracted(text) => Some(text),
            ExtractionResult::Failed { .. } => None,
        }
    }
}
