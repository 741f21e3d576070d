pub mod completions;
pub mod gate;
pub mod generator;

#[cfg(test)]
pub(crate) mod test_support;

pub use completions::{CompletionRequest, CompletionsClient, LanguageModel};
pub use gate::{GateCheckpoint, GateConfig, GateVerdict, SubjectGate, parse_verdict};
pub use generator::{AnswerGenerator, FALLBACK_ANSWER, GeneratorConfig};
