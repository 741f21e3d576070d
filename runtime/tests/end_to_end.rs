use std::{
    collections::VecDeque,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use subject_rag::{
    AppState,
    ai::{CompletionRequest, FALLBACK_ANSWER, LanguageModel},
    config::AppConfig,
    error::{ExtractError, ModelCallError, QaError},
    locale::{Locale, Message},
    pipeline::{OcrEngine, extract_pdf_text},
    qa::{AnswerResult, ProcessRequest},
};
use tempfile::TempDir;

struct ScriptedModel {
    replies: Mutex<VecDeque<&'static str>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    fn new(replies: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<CompletionRequest> {
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
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => Ok(Some(reply.to_string())),
            None => Err(ModelCallError::Decode("no reply scripted".to_string())),
        }
    }
}

struct FixedOcr(&'static str);

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image_path: &Path) -> Result<String, ExtractError> {
        Ok(self.0.to_string())
    }
}

fn config(uploads: &Path) -> AppConfig {
    let yaml = format!(
        "server:\n  host: 127.0.0.1\n  port: 0\nuploads:\n  dir: {}\n",
        uploads.display()
    );
    serde_yaml::from_str(&yaml).expect("test config")
}

async fn state(tmp: &TempDir, model: Arc<ScriptedModel>) -> AppState {
    AppState::with_ocr(
        config(&tmp.path().join("uploads")),
        model,
        Arc::new(FixedOcr("Chlorophyll absorbs light.")),
    )
    .await
    .expect("app state")
}

/// Single-page PDF with one line of Helvetica text.
fn pdf_with_text(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

fn request(subject: &str, question: &str, language: &str) -> ProcessRequest {
    ProcessRequest {
        subject: subject.to_string(),
        question: question.to_string(),
        language: Some(language.to_string()),
        documents: Vec::new(),
    }
}

#[tokio::test]
async fn in_scope_question_without_documents_is_answered() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["true", "Mitosis is the division of a cell nucleus.", "true"]);
    let state = state(&tmp, model.clone()).await;

    let result = state
        .service
        .process(request("Biology", "What is mitosis?", "en"))
        .await
        .expect("answered");

    assert!(result.is_answered());
    assert_eq!(result.language(), "en");
    assert!(!result.text().is_empty());

    let calls = model.calls();
    assert_eq!(calls.len(), 3);
    assert!(!calls[1].user.contains("Context:"));
    assert!(calls[1].user.ends_with("Question: What is mitosis?"));
}

#[tokio::test]
async fn off_topic_hindi_question_is_rejected_without_generation() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["false"]);
    let state = state(&tmp, model.clone()).await;

    let result = state
        .service
        .process(request("Biology", "What is the capital of France?", "hi"))
        .await
        .expect("rejection is not an error");

    assert_eq!(
        result,
        AnswerResult::OutOfScope {
            message: Message::ScopeViolation.render(Locale::Hi, "Biology"),
            language: "hi".to_string(),
        }
    );
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn corrupted_pdf_is_skipped_and_all_uploads_are_removed() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["true", "Photosynthesis makes sugar.", "true"]);
    let state = state(&tmp, model.clone()).await;

    let valid_bytes = pdf_with_text("photosynthesis test phrase");
    let expected = extract_pdf_text(valid_bytes.clone())
        .await
        .expect("valid pdf parses");
    assert!(expected.contains("photosynthesis test phrase"));

    let valid = state
        .uploads
        .stage("notes.pdf", "application/pdf", &valid_bytes)
        .await
        .unwrap();
    let corrupt = state
        .uploads
        .stage("broken.pdf", "application/pdf", b"%PDF-1.4 truncated garbage")
        .await
        .unwrap();
    let paths = [valid.path.clone(), corrupt.path.clone()];

    let context = state
        .service
        .pipeline()
        .extract_all(vec![valid, corrupt])
        .await;

    assert_eq!(context, expected);
    assert!(paths.iter().all(|path| !path.exists()));
}

#[tokio::test]
async fn documents_feed_the_generator_in_upload_order() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["true", "Plants use light.", "true"]);
    let state = state(&tmp, model.clone()).await;

    let pdf = state
        .uploads
        .stage(
            "notes.pdf",
            "application/pdf",
            &pdf_with_text("light reactions"),
        )
        .await
        .unwrap();
    let image = state
        .uploads
        .stage("board.png", "image/png", b"png bytes")
        .await
        .unwrap();

    let mut req = request("Biology", "How do plants make food?", "en");
    req.documents = vec![pdf, image];
    let result = state.service.process(req).await.expect("answered");
    assert_eq!(result.text(), "Plants use light.");

    let generation = &model.calls()[1];
    let context_at = generation.user.find("light reactions").expect("pdf text");
    let ocr_at = generation
        .user
        .find("Chlorophyll absorbs light.")
        .expect("ocr text");
    assert!(context_at < ocr_at);

    let mut leftovers = tokio::fs::read_dir(state.uploads.dir()).await.unwrap();
    assert!(leftovers.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn rejection_text_does_not_reveal_which_gate_fired() {
    let tmp = TempDir::new().unwrap();
    let at_question = state(&tmp, ScriptedModel::new(&["false"]))
        .await
        .service
        .process(request("History", "Explain photosynthesis", "en"))
        .await
        .unwrap();
    let at_answer = state(&tmp, ScriptedModel::new(&["true", "Plants use light.", "nope"]))
        .await
        .service
        .process(request("History", "Explain photosynthesis", "en"))
        .await
        .unwrap();

    assert_eq!(at_question.text().as_bytes(), at_answer.text().as_bytes());
}

#[tokio::test]
async fn blank_question_never_reaches_the_model() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["true", "answer", "true"]);
    let state = state(&tmp, model.clone()).await;

    let err = state
        .service
        .process(request("Biology", "   ", "en"))
        .await
        .unwrap_err();
    assert!(matches!(err, QaError::MissingField(_)));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn provider_silence_after_gate_yields_fallback_answer() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(&["true", "   ", "true"]);
    let state = state(&tmp, model).await;

    let result = state
        .service
        .process(request("Biology", "What is mitosis?", "en"))
        .await
        .unwrap();
    assert_eq!(result.text(), FALLBACK_ANSWER);
}
