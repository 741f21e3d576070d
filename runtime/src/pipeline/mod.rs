pub mod extractor;
pub mod ocr;
pub mod pipeline;
pub mod types;
pub mod uploads;

pub use extractor::{DocumentExtractor, MediaDocumentExtractor, extract_pdf_text};
pub use ocr::{OcrEngine, TesseractOcr};
pub use pipeline::{ExtractionPipeline, PipelineConfig, join_context};
pub use types::{ExtractionResult, MediaKind, UploadedFile};
pub use uploads::{FileRepository, FsFileRepository, UploadStore};
