use tracing::{error, info};

use super::context::RequestContext;
use crate::{
    ai::{AnswerGenerator, GateCheckpoint, SubjectGate},
    error::QaError,
    locale::Message,
};

/// What the caller gets back.
///
/// A rejection carries only the localized scope message; which checkpoint
/// fired is never part of the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerResult {
    Answered { text: String, language: String },
    OutOfScope { message: String, language: String },
}

impl AnswerResult {
    pub fn text(&self) -> &str {
        match self {
            AnswerResult::Answered { text, .. } => text,
            AnswerResult::OutOfScope { message, .. } => message,
        }
    }

    pub fn language(&self) -> &str {
        match self {
            AnswerResult::Answered { language, .. } | AnswerResult::OutOfScope { language, .. } => {
                language
            }
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, AnswerResult::Answered { .. })
    }
}

enum Stage {
    QuestionGate,
    Generate,
    AnswerGate(String),
    Rejected(GateCheckpoint),
    Accepted(String),
}

/// Gate the question, generate, then gate the answer.
///
/// The three model calls run strictly one after another; a rejection at
/// either gate ends the request with the same scope message.
pub struct RequestCoordinator {
    gate: SubjectGate,
    generator: AnswerGenerator,
}

impl RequestCoordinator {
    pub fn new(gate: SubjectGate, generator: AnswerGenerator) -> Self {
        Self { gate, generator }
    }

    pub async fn respond(&self, request: &RequestContext) -> Result<AnswerResult, QaError> {
        let mut stage = Stage::QuestionGate;
        loop {
            stage = match stage {
                Stage::QuestionGate => {
                    let verdict = self
                        .gate
                        .check(GateCheckpoint::Question, request.subject(), request.question())
                        .await
                        .inspect_err(|err| error!(error = %err, "question gate call failed"))?;
                    if verdict.in_scope {
                        Stage::Generate
                    } else {
                        Stage::Rejected(GateCheckpoint::Question)
                    }
                }
                Stage::Generate => {
                    let answer = self
                        .generator
                        .generate(
                            request.subject(),
                            request.question(),
                            request.context(),
                            request.language(),
                        )
                        .await
                        .inspect_err(|err| error!(error = %err, "answer generation failed"))?;
                    Stage::AnswerGate(answer)
                }
                Stage::AnswerGate(answer) => {
                    let verdict = self
                        .gate
                        .check(GateCheckpoint::Answer, request.subject(), &answer)
                        .await
                        .inspect_err(|err| error!(error = %err, "answer gate call failed"))?;
                    if verdict.in_scope {
                        Stage::Accepted(answer)
                    } else {
                        Stage::Rejected(GateCheckpoint::Answer)
                    }
                }
                Stage::Rejected(checkpoint) => {
                    info!(?checkpoint, subject = %request.subject(), "request rejected as out of scope");
                    return Ok(AnswerResult::OutOfScope {
                        message: Message::ScopeViolation.render(request.locale(), request.subject()),
                        language: request.language().to_string(),
                    });
                }
                Stage::Accepted(text) => {
                    return Ok(AnswerResult::Answered {
                        text,
                        language: request.language().to_string(),
                    });
                }
            };
        }
    }
}
