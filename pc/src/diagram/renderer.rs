//! Rendering adapter for the external diagram renderer
//!
//! The normalizer's output is handed unchanged to a third-party renderer.
//! Callers must catch `RenderError` and display a fallback message; a render
//! failure is never retried automatically.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RenderConfig;

/// Errors from the rendering adapter
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer binary '{0}' not available")]
    Unavailable(String),

    #[error("Renderer failed (exit {status}): {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract for converting flowchart markup into a scalable vector image
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render markup to SVG text
    async fn render(&self, markup: &str) -> Result<String, RenderError>;
}

/// Renderer backed by the mermaid CLI (`mmdc`)
///
/// Writes the markup to a scratch file, invokes the binary, and reads the
/// SVG back. Scratch files live under the system temp dir and are removed on
/// both success and failure.
pub struct MmdcRenderer {
    bin: String,
    theme: String,
}

impl MmdcRenderer {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            bin: config.mmdc_bin.clone(),
            theme: config.theme.clone(),
        }
    }

    fn scratch_paths(&self) -> (PathBuf, PathBuf) {
        let stem = uuid::Uuid::now_v7().to_string();
        let dir = std::env::temp_dir();
        (dir.join(format!("{stem}.mmd")), dir.join(format!("{stem}.svg")))
    }
}

#[async_trait]
impl DiagramRenderer for MmdcRenderer {
    async fn render(&self, markup: &str) -> Result<String, RenderError> {
        debug!(bin = %self.bin, markup_len = markup.len(), "render: called");
        let (input_path, output_path) = self.scratch_paths();

        tokio::fs::write(&input_path, markup).await?;

        let result = tokio::process::Command::new(&self.bin)
            .arg("-i")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .arg("-t")
            .arg(&self.theme)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let _ = tokio::fs::remove_file(&input_path).await;
                return Err(RenderError::Unavailable(self.bin.clone()));
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&input_path).await;
                return Err(RenderError::Io(e));
            }
        };

        let svg = if output.status.success() {
            Ok(tokio::fs::read_to_string(&output_path).await?)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), "render: mmdc failed");
            Err(RenderError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            })
        };

        let _ = tokio::fs::remove_file(&input_path).await;
        let _ = tokio::fs::remove_file(&output_path).await;

        svg
    }
}
