use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
    routing::post,
};
use tracing::{error, info, warn};

use super::types::ProcessResponse;
use crate::{
    AppState,
    error::QaError,
    locale::Locale,
    pipeline::{MediaKind, UploadedFile},
    qa::ProcessRequest,
};

type Reply = (StatusCode, Json<ProcessResponse>);

#[derive(Default)]
struct ProcessForm {
    subject: String,
    question: String,
    language: Option<String>,
}

pub fn process_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/process", post(process_documents))
}

async fn process_documents(State(state): State<Arc<AppState>>, multipart: Multipart) -> Reply {
    let mut staged = Vec::new();
    let form = match read_form(&state, multipart, &mut staged).await {
        Ok(form) => form,
        Err(reply) => {
            state.service.pipeline().discard(&staged).await;
            return reply;
        }
    };

    let language = state.service.resolve_language(form.language.as_deref());
    let subject = form.subject.trim().to_string();
    info!(subject = %subject, language = %language, documents = staged.len(), "processing request");

    let result = state
        .service
        .process(ProcessRequest {
            subject: form.subject,
            question: form.question,
            language: Some(language.clone()),
            documents: staged,
        })
        .await;

    match result {
        Ok(answer) => (StatusCode::OK, Json(ProcessResponse::answered(&answer))),
        Err(err) => error_reply(&err, Locale::from_code(&language), &subject),
    }
}

fn error_reply(err: &QaError, locale: Locale, subject: &str) -> Reply {
    let status = match err {
        QaError::MissingField(_) => {
            warn!(error = %err, "rejected incomplete request");
            StatusCode::BAD_REQUEST
        }
        QaError::ModelCall(_) => {
            error!(error = %err, "failed to process request");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ProcessResponse::failure(err.user_message(locale, subject))),
    )
}

fn reject(status: StatusCode, message: impl Into<String>) -> Reply {
    let message = message.into();
    warn!(%status, error = %message, "rejected upload");
    (status, Json(ProcessResponse::failure(message)))
}

async fn read_form(
    state: &AppState,
    mut multipart: Multipart,
    staged: &mut Vec<UploadedFile>,
) -> Result<ProcessForm, Reply> {
    let mut form = ProcessForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("invalid multipart payload: {err}"),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "subject" => form.subject = read_text(field).await?,
            "question" => form.question = read_text(field).await?,
            "language" => form.language = Some(read_text(field).await?),
            "documents" => {
                if let Some(file) = stage_document(state, field, staged.len()).await? {
                    staged.push(file);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, Reply> {
    field.text().await.map_err(|err| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("failed to read form field: {err}"),
        )
    })
}

/// Validate and persist one `documents` part. Empty file inputs are skipped.
async fn stage_document(
    state: &AppState,
    mut field: Field<'_>,
    already_staged: usize,
) -> Result<Option<UploadedFile>, Reply> {
    let limits = &state.config.uploads;
    let file_name = field.file_name().unwrap_or_default().to_string();
    if file_name.trim().is_empty() {
        return Ok(None);
    }

    let content_type = field.content_type().unwrap_or_default().to_string();
    if MediaKind::from_mime(&content_type).is_none() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Only PDF and image files are allowed",
        ));
    }

    if already_staged >= limits.effective_max_files() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!(
                "At most {} documents are allowed per request",
                limits.effective_max_files()
            ),
        ));
    }

    state.uploads.sanitize_filename(&file_name).map_err(|err| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("invalid filename '{file_name}': {err}"),
        )
    })?;

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|err| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("failed to read upload field: {err}"),
        )
    })? {
        if bytes.len() + chunk.len() > limits.max_file_bytes {
            return Err(reject(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "Document '{}' exceeds the {} MB limit",
                    file_name,
                    limits.max_file_bytes / (1024 * 1024)
                ),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }

    let file = state
        .uploads
        .stage(&file_name, &content_type, &bytes)
        .await
        .map_err(|err| {
            error!(error = %err, file = %file_name, "failed to persist uploaded file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessResponse::failure("failed to store uploaded document")),
            )
        })?;
    Ok(Some(file))
}
