use tracing::info;

use super::{
    context::{RequestContext, validate_fields},
    coordinator::{AnswerResult, RequestCoordinator},
};
use crate::{error::QaError, pipeline::ExtractionPipeline, pipeline::UploadedFile};

/// Raw inputs of one "process request" call.
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub subject: String,
    pub question: String,
    pub language: Option<String>,
    pub documents: Vec<UploadedFile>,
}

/// Extraction followed by the gated answer protocol for one request.
pub struct QaService {
    pipeline: ExtractionPipeline,
    coordinator: RequestCoordinator,
    default_language: String,
}

impl QaService {
    pub fn new(
        pipeline: ExtractionPipeline,
        coordinator: RequestCoordinator,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            coordinator,
            default_language: default_language.into(),
        }
    }

    pub fn pipeline(&self) -> &ExtractionPipeline {
        &self.pipeline
    }

    /// The requested language, or the configured default when none was given.
    pub fn resolve_language(&self, language: Option<&str>) -> String {
        language
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(self.default_language.as_str())
            .to_string()
    }

    pub async fn process(&self, request: ProcessRequest) -> Result<AnswerResult, QaError> {
        let ProcessRequest {
            subject,
            question,
            language,
            documents,
        } = request;
        let language = self.resolve_language(language.as_deref());

        if let Err(err) = validate_fields(&subject, &question) {
            self.pipeline.discard(&documents).await;
            return Err(err);
        }

        let document_count = documents.len();
        let context = self.pipeline.extract_all(documents).await;
        info!(
            documents = document_count,
            context_chars = context.chars().count(),
            "document context prepared"
        );

        let request = RequestContext::new(&subject, &question, &language, context)?;
        self.coordinator.respond(&request).await
    }
}
