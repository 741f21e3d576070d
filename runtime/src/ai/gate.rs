use std::{sync::Arc, time::Duration};

use tracing::debug;

use super::completions::{CompletionRequest, LanguageModel, complete_within};
use crate::{
    config::{ModelsConfig, TimeoutsConfig},
    error::ModelCallError,
};

/// Where in the request the gate is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCheckpoint {
    Question,
    Answer,
}

impl GateCheckpoint {
    fn system_prompt(self) -> &'static str {
        match self {
            GateCheckpoint::Question => {
                "You are a relevance checker. Your only job is to determine if a question is related to a given subject. Respond with \"true\" or \"false\" only."
            }
            GateCheckpoint::Answer => {
                "You are a response verifier. Your only job is to check if a response stays strictly within the given subject scope. Respond with \"true\" or \"false\" only."
            }
        }
    }

    fn user_prompt(self, subject: &str, text: &str) -> String {
        match self {
            GateCheckpoint::Question => format!(
                "Determine if the following question is related to the subject \"{subject}\".\nQuestion: \"{text}\"\n\nRespond ONLY with \"true\" if the question is related to {subject}, or \"false\" if it is not."
            ),
            GateCheckpoint::Answer => format!(
                "Is the following response strictly about \"{subject}\" and does it avoid answering questions outside this scope?\nResponse: \"{text}\"\n\nRespond with \"true\" if the response is properly scoped, or \"false\" if it answers questions outside the specified subject."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateVerdict {
    pub in_scope: bool,
    pub checkpoint: GateCheckpoint,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::from_config(&ModelsConfig::default(), &TimeoutsConfig::default())
    }
}

impl GateConfig {
    pub fn from_config(models: &ModelsConfig, timeouts: &TimeoutsConfig) -> Self {
        Self {
            model: models.gate_model.clone(),
            temperature: models.gate_temperature,
            max_tokens: models.gate_max_tokens,
            timeout: timeouts.model_call(),
        }
    }
}

/// Binary classifier deciding whether text stays within a declared subject.
///
/// Every call is an independent judgment: nothing is cached and nothing is
/// retried. Anything other than a plain `true` is treated as out of scope.
pub struct SubjectGate {
    model: Arc<dyn LanguageModel>,
    config: GateConfig,
}

impl SubjectGate {
    pub fn new(model: Arc<dyn LanguageModel>, config: GateConfig) -> Self {
        Self { model, config }
    }

    pub async fn check(
        &self,
        checkpoint: GateCheckpoint,
        subject: &str,
        text: &str,
    ) -> Result<GateVerdict, ModelCallError> {
        let request = CompletionRequest::classification(
            self.config.model.as_str(),
            checkpoint.system_prompt(),
            checkpoint.user_prompt(subject, text),
            self.config.temperature,
            self.config.max_tokens,
        );

        let output = complete_within(self.model.as_ref(), &request, self.config.timeout).await?;
        let in_scope = output.as_deref().is_some_and(parse_verdict);
        debug!(?checkpoint, subject = %subject, in_scope, raw = ?output, "gate verdict");

        Ok(GateVerdict {
            in_scope,
            checkpoint,
            subject: subject.to_string(),
            text: text.to_string(),
        })
    }

    pub async fn is_in_scope(&self, subject: &str, text: &str) -> Result<bool, ModelCallError> {
        Ok(self
            .check(GateCheckpoint::Question, subject, text)
            .await?
            .in_scope)
    }
}

/// Fail-closed parse of a classifier completion.
pub fn parse_verdict(output: &str) -> bool {
    output.trim().eq_ignore_ascii_case("true")
}
