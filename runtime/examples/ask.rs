//! Ask one question from the command line, optionally with documents.
//!
//! cargo run --example ask -- Biology "What is mitosis?" notes.pdf board.png

use std::{env, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use subject_rag::{
    AppState,
    ai::CompletionsClient,
    config::load_config,
    qa::ProcessRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).compact().init();

    let api_key = env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY environment variable must be set to run this example")?;
    let base = env::var("OPENAI_BASE_URL").ok();
    let language = env::var("ANSWER_LANGUAGE").ok();

    let mut args = env::args().skip(1);
    let (Some(subject), Some(question)) = (args.next(), args.next()) else {
        bail!("usage: ask <subject> <question> [documents...]");
    };

    let config = load_config().await?;
    let model = Arc::new(CompletionsClient::new(api_key, base)?);
    let state = AppState::build(config, model).await?;

    let mut documents = Vec::new();
    for path in args {
        let content_type = match Path::new(&path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => "application/pdf",
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            _ => bail!("only PDF and image files are supported: {path}"),
        };
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {path}"))?;
        let name = Path::new(&path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        documents.push(state.uploads.stage(name, content_type, &bytes).await?);
    }

    let result = state
        .service
        .process(ProcessRequest {
            subject,
            question,
            language,
            documents,
        })
        .await?;

    println!("[{}] {}", result.language(), result.text());
    Ok(())
}
