//! Optical character recognition for image uploads.
//!
//! The default engine shells out to the Tesseract CLI with a multilingual
//! model list (`eng+hin` unless configured otherwise).

use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::{config::OcrConfig, error::ExtractError};

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
    languages: String,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            languages: config.languages.clone(),
        }
    }

    /// Whether the configured binary can be launched at all.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    pub fn availability_hint(&self) -> String {
        format!(
            "{} not found; image uploads will contribute no text (install tesseract-ocr with the {} language data)",
            self.binary, self.languages
        )
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image_path: &Path) -> Result<String, ExtractError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.languages])
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractError::Ocr(format!(
                    "{} failed: {}",
                    self.binary,
                    stderr.trim()
                )))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ExtractError::Ocr(
                format!("{} not found (install tesseract-ocr)", self.binary),
            )),
            Err(err) => Err(ExtractError::Ocr(err.to_string())),
        }
    }
}
