use std::{fmt, time::Duration};

use thiserror::Error;

use crate::locale::{Locale, Message};

/// Required form fields checked before any model call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Subject,
    Question,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Subject => f.write_str("subject"),
            Field::Question => f.write_str("question"),
        }
    }
}

/// Failure to turn a single uploaded file into text.
///
/// These never leave the extraction pipeline: a failed file contributes no
/// context and the rest of the batch carries on.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("OCR failed: {0}")]
    Ocr(String),
    #[error("failed to read upload: {0:#}")]
    Io(anyhow::Error),
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of a call to the language-model provider. Never retried.
#[derive(Debug, Error)]
pub enum ModelCallError {
    #[error("network error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum QaError {
    #[error("missing required field: {0}")]
    MissingField(Field),
    #[error("model call failed: {0}")]
    ModelCall(#[from] ModelCallError),
}

impl QaError {
    /// The only text a caller ever sees for this error.
    pub fn user_message(&self, locale: Locale, subject: &str) -> String {
        match self {
            QaError::MissingField(_) => Message::MissingFields.render(locale, subject),
            QaError::ModelCall(_) => Message::ProcessingError.render(locale, subject),
        }
    }
}
