use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::qa::AnswerResult;

/// JSON envelope returned by `POST /api/process`.
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, TS, Serialize)]
#[ts(export)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl ProcessResponse {
    pub fn answered(result: &AnswerResult) -> Self {
        Self {
            success: true,
            response: Some(result.text().to_string()),
            language: Some(result.language().to_string()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
