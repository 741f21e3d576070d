use std::{
    collections::VecDeque,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;

use super::completions::{CompletionRequest, LanguageModel};
use crate::error::ModelCallError;

/// Replays canned replies in order and records every request it sees.
pub(crate) struct ScriptedModel {
    script: Mutex<VecDeque<Result<Option<String>, ModelCallError>>>,
    calls: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub(crate) fn new(script: Vec<Result<Option<String>, ModelCallError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub(crate) fn replies(replies: &[&str]) -> Self {
        Self::new(
            replies
                .iter()
                .map(|reply| Ok(Some(reply.to_string())))
                .collect(),
        )
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ModelCallError> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelCallError::Decode("script exhausted".to_string())))
    }
}

/// Deterministic model: answers from a pure function of the request.
pub(crate) struct RuleModel<F>(pub(crate) F);

#[async_trait]
impl<F> LanguageModel for RuleModel<F>
where
    F: Fn(&CompletionRequest) -> Option<String> + Send + Sync,
{
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ModelCallError> {
        Ok((self.0)(request))
    }
}
