//! Long-lived OCR worker thread.
//!
//! One worker owns one `RasterOcr` instance and serves jobs in order.
//! Callers await a oneshot reply, so the async side never blocks on OCR.
//! `dispose` closes the job channel and joins the thread; after it returns
//! the engine instance has been dropped.

use super::{OcrOptions, RasterOcr};
use crate::error::{RecognitionError, RecognitionResult};
use std::sync::mpsc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

struct Job {
    image: Vec<u8>,
    reply: oneshot::Sender<RecognitionResult<String>>,
}

pub struct OcrWorker {
    sender: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    options: OcrOptions,
}

impl OcrWorker {
    /// Start a worker thread that owns `engine`.
    pub fn spawn(mut engine: Box<dyn RasterOcr>, options: OcrOptions) -> RecognitionResult<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread_options = options.clone();

        let handle = std::thread::Builder::new()
            .name("ink-ocr-worker".to_string())
            .spawn(move || {
                log::info!(
                    "[OCR] Worker started (language={}, layout={:?})",
                    thread_options.language,
                    thread_options.layout
                );
                while let Ok(job) = receiver.recv() {
                    let start = std::time::Instant::now();
                    let result = engine.raster_to_text(&job.image, &thread_options);
                    match &result {
                        Ok(text) => log::info!(
                            "[OCR] Extracted {} chars in {}ms",
                            text.chars().count(),
                            start.elapsed().as_millis()
                        ),
                        Err(e) => log::error!("[OCR] Recognition failed: {}", e),
                    }
                    // Caller may have gone away; nothing to do then.
                    let _ = job.reply.send(result);
                }
                log::info!("[OCR] Worker stopped");
            })
            .map_err(|e| RecognitionError::Engine(format!("Failed to start OCR worker: {}", e)))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            options,
        })
    }

    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue an image and wait for its text.
    pub async fn recognize(&self, image: Vec<u8>) -> RecognitionResult<String> {
        let reply = self.submit(image)?;
        reply
            .await
            .map_err(|_| RecognitionError::Engine("OCR worker dropped the request".to_string()))?
    }

    /// Queue an image; the returned receiver resolves with its text.
    pub(crate) fn submit(
        &self,
        image: Vec<u8>,
    ) -> RecognitionResult<oneshot::Receiver<RecognitionResult<String>>> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| RecognitionError::Engine("OCR worker has been disposed".to_string()))?;
        let (reply, receiver) = oneshot::channel();
        sender
            .send(Job { image, reply })
            .map_err(|_| RecognitionError::Engine("OCR worker is not running".to_string()))?;
        Ok(receiver)
    }

    /// Stop the worker and wait for its thread to exit. Idempotent.
    pub fn dispose(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[OCR] Worker thread panicked");
            }
        }
    }
}

impl Drop for OcrWorker {
    fn drop(&mut self) {
        self.dispose();
    }
}
