//! Subject-scoped question answering over uploaded documents.
//!
//! Uploaded PDFs and images are turned into plain-text context, then a
//! question is answered by a language model behind two subject gates: one on
//! the question, one on the generated answer.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

pub mod ai;
pub mod config;
pub mod error;
pub mod locale;
pub mod pipeline;
pub mod qa;
pub mod routes;

use ai::{AnswerGenerator, GateConfig, GeneratorConfig, LanguageModel, SubjectGate};
use config::AppConfig;
use pipeline::{
    ExtractionPipeline, MediaDocumentExtractor, OcrEngine, PipelineConfig, TesseractOcr,
    UploadStore,
};
use qa::{QaService, RequestCoordinator};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub uploads: Arc<UploadStore>,
    pub service: Arc<QaService>,
}

impl AppState {
    /// Wire the service from configuration with the given model client and
    /// the Tesseract OCR engine.
    pub async fn build(config: AppConfig, model: Arc<dyn LanguageModel>) -> Result<Self> {
        let ocr = TesseractOcr::new(&config.ocr);
        if !ocr.is_available().await {
            warn!(hint = %ocr.availability_hint(), "OCR engine unavailable");
        }
        Self::with_ocr(config, model, Arc::new(ocr)).await
    }

    pub async fn with_ocr(
        config: AppConfig,
        model: Arc<dyn LanguageModel>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Result<Self> {
        let uploads = UploadStore::new(&config.uploads.dir)
            .await
            .context("Failed to prepare uploads directory")?;

        let extractor = Arc::new(MediaDocumentExtractor::new(uploads.file_repo(), ocr));
        let pipeline = ExtractionPipeline::new(
            extractor,
            uploads.file_repo(),
            PipelineConfig::from_config(&config.timeouts),
        );

        let coordinator = RequestCoordinator::new(
            SubjectGate::new(
                model.clone(),
                GateConfig::from_config(&config.models, &config.timeouts),
            ),
            AnswerGenerator::new(
                model,
                GeneratorConfig::from_config(&config.models, &config.timeouts),
            ),
        );

        let service = QaService::new(pipeline, coordinator, config.default_language.clone());

        Ok(Self {
            config: Arc::new(config),
            uploads: Arc::new(uploads),
            service: Arc::new(service),
        })
    }
}
