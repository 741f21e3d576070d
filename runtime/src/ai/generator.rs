use std::{sync::Arc, time::Duration};

use super::completions::{CompletionRequest, LanguageModel, complete_within};
use crate::{
    config::{ModelsConfig, TimeoutsConfig},
    error::ModelCallError,
};

pub const FALLBACK_ANSWER: &str = "Sorry, I could not generate a response.";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::from_config(&ModelsConfig::default(), &TimeoutsConfig::default())
    }
}

impl GeneratorConfig {
    pub fn from_config(models: &ModelsConfig, timeouts: &TimeoutsConfig) -> Self {
        Self {
            model: models.answer_model.clone(),
            temperature: models.answer_temperature,
            max_tokens: models.answer_max_tokens,
            timeout: timeouts.model_call(),
        }
    }
}

pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    config: GeneratorConfig,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, config: GeneratorConfig) -> Self {
        Self { model, config }
    }

    pub async fn generate(
        &self,
        subject: &str,
        question: &str,
        context: &str,
        language: &str,
    ) -> Result<String, ModelCallError> {
        let request = CompletionRequest::generation(
            self.config.model.as_str(),
            system_prompt(subject, language),
            user_prompt(subject, question, context),
            self.config.temperature,
            self.config.max_tokens,
        );

        let output = complete_within(self.model.as_ref(), &request, self.config.timeout).await?;
        Ok(output
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ANSWER.to_string()))
    }
}

fn system_prompt(subject: &str, language: &str) -> String {
    [
        format!(
            "You are a helpful assistant that provides accurate and detailed answers exclusively about {subject}."
        ),
        format!("Always answer in {language}."),
        "Your answer must be final: do not leave additional tasks for the user. Act as the last and only application being used, and do not redirect the user to other apps or other tasks unless it is absolutely required.".to_string(),
        "If a search or analysis is requested, you may return a few of the most relevant links as part of your research, or base your reply on that research or analysis.".to_string(),
        format!(
            "If a question is not directly related to {subject}, respond with a polite message explaining that the question is outside your scope."
        ),
    ]
    .join(" ")
}

fn user_prompt(subject: &str, question: &str, context: &str) -> String {
    let mut sections = vec![format!(
        "You are an AI assistant specialized in {subject}. You must ONLY answer questions that are directly related to {subject} and its core topics."
    )];
    if !context.trim().is_empty() {
        sections.push(format!("Context: {context}"));
    }
    sections.push(format!("Question: {question}"));
    sections.join("\n\n")
}
