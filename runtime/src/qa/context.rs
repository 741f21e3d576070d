use crate::{
    error::{Field, QaError},
    locale::Locale,
};

/// Reject blank subjects or questions before anything else happens.
pub fn validate_fields(subject: &str, question: &str) -> Result<(), QaError> {
    if subject.trim().is_empty() {
        return Err(QaError::MissingField(Field::Subject));
    }
    if question.trim().is_empty() {
        return Err(QaError::MissingField(Field::Question));
    }
    Ok(())
}

/// A validated question with its subject boundary and document context.
///
/// Only constructible through [`RequestContext::new`], so holding one means the
/// required fields were present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    subject: String,
    question: String,
    language: String,
    context: String,
}

impl RequestContext {
    pub fn new(
        subject: &str,
        question: &str,
        language: &str,
        context: String,
    ) -> Result<Self, QaError> {
        validate_fields(subject, question)?;
        Ok(Self {
            subject: subject.trim().to_string(),
            question: question.trim().to_string(),
            language: language.trim().to_string(),
            context,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn locale(&self) -> Locale {
        Locale::from_code(&self.language)
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}
