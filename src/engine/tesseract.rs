//! Default local OCR: the `tesseract` command-line tool.
//!
//! The image goes in on stdin and text comes back on stdout, so nothing
//! touches disk. `--psm 6` (single uniform block) suits handwriting;
//! `--psm 3` (fully automatic segmentation) suits printed pages.

use super::{LayoutMode, OcrOptions, RasterOcr};
use crate::error::{truncate_body, RecognitionError, RecognitionResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl TesseractCli {
    /// Find `tesseract` on PATH.
    pub fn locate() -> RecognitionResult<Self> {
        let binary = which::which("tesseract").map_err(|e| {
            RecognitionError::Configuration(format!(
                "Local OCR needs the tesseract binary on PATH ({})",
                e
            ))
        })?;
        log::info!("[OCR] Using {}", binary.display());
        Ok(Self { binary })
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Command-line arguments for one recognition run.
    pub fn args(options: &OcrOptions) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            options.language.clone(),
            "--psm".to_string(),
            page_segmentation_mode(options.layout).to_string(),
        ]
    }
}

fn page_segmentation_mode(layout: LayoutMode) -> u8 {
    match layout {
        LayoutMode::SingleBlock => 6,
        LayoutMode::Auto => 3,
    }
}

impl RasterOcr for TesseractCli {
    fn raster_to_text(&mut self, image: &[u8], options: &OcrOptions) -> RecognitionResult<String> {
        let mut child = Command::new(&self.binary)
            .args(Self::args(options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RecognitionError::Engine(format!(
                    "Failed to spawn {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        // Always reap the child. A failed write usually means tesseract
        // already exited, and its stderr is the message worth reporting.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "no stdin for tesseract",
            )),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| RecognitionError::Engine(format!("tesseract did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                truncate_body(stderr.trim())
            )));
        }
        if let Err(e) = write_result {
            return Err(RecognitionError::Engine(format!(
                "tesseract stdin write failed: {}",
                e
            )));
        }

        // Tesseract ends its output with a form feed.
        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{c}')
            .to_string())
    }
}
