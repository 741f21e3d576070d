use std::sync::Arc;

use async_trait::async_trait;

use super::{
    ocr::OcrEngine,
    types::{MediaKind, UploadedFile},
    uploads::FileRepository,
};
use crate::error::ExtractError;

/// Turns one uploaded file into plain text. Never deletes the source file.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError>;
}

/// Dispatches on media kind: PDFs use their embedded text layer, images go
/// through OCR.
#[derive(Clone)]
pub struct MediaDocumentExtractor {
    file_repo: Arc<dyn FileRepository>,
    ocr: Arc<dyn OcrEngine>,
}

impl MediaDocumentExtractor {
    pub fn new(file_repo: Arc<dyn FileRepository>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { file_repo, ocr }
    }
}

#[async_trait]
impl DocumentExtractor for MediaDocumentExtractor {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        match file.media_kind()? {
            MediaKind::Pdf => {
                let bytes = self
                    .file_repo
                    .read(&file.path)
                    .await
                    .map_err(ExtractError::Io)?;
                extract_pdf_text(bytes).await
            }
            MediaKind::Image => self.ocr.recognize(&file.path).await,
        }
    }
}

/// Read the text layer of a PDF. A document without one yields an empty string.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, ExtractError> {
    // pdf-extract is synchronous and may panic on malformed input.
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|err| ExtractError::Pdf(format!("parser aborted: {err}")))?
        .map_err(|err| ExtractError::Pdf(err.to_string()))
}
