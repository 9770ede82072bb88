//! Local OCR engine lifecycle with a scripted `RasterOcr`.

use image::{Rgba, RgbaImage};
use ink_ocr_lib::engine::{
    EngineReply, LayoutMode, LocalOcrEngine, OcrOptions, RasterOcr, RecognitionEngine,
};
use ink_ocr_lib::raster::{ImageSource, RasterImage};
use ink_ocr_lib::{RecognitionError, RecognitionResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts live instances so tests can see when a worker's engine is gone.
struct Scripted {
    live: Arc<AtomicUsize>,
}

impl RasterOcr for Scripted {
    fn raster_to_text(&mut self, image: &[u8], options: &OcrOptions) -> RecognitionResult<String> {
        if image.is_empty() {
            return Err(RecognitionError::Engine("empty image".to_string()));
        }
        let layout = match options.layout {
            LayoutMode::SingleBlock => "block",
            LayoutMode::Auto => "auto",
        };
        Ok(format!("{}/{}", options.language, layout))
    }
}

impl Drop for Scripted {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn engine(options: OcrOptions) -> (LocalOcrEngine, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let live = Arc::new(AtomicUsize::new(0));
    let created = Arc::new(AtomicUsize::new(0));
    let (l, c) = (live.clone(), created.clone());
    let engine = LocalOcrEngine::with_factory(options, move || {
        l.fetch_add(1, Ordering::SeqCst);
        c.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Scripted { live: l.clone() }) as Box<dyn RasterOcr>)
    });
    (engine, live, created)
}

fn png() -> RasterImage {
    let mut buffer = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
    buffer.put_pixel(3, 3, Rgba([0, 0, 0, 255]));
    RasterImage::encode_png(&buffer).unwrap()
}

#[tokio::test]
async fn worker_starts_lazily_and_is_reused() {
    let (engine, live, created) = engine(OcrOptions::new("eng", true));
    assert!(!engine.has_worker());

    let reply = engine.recognize_bitmap(&png()).await.unwrap();
    assert_eq!(reply, EngineReply::Text("eng/block".to_string()));
    engine.recognize_bitmap(&png()).await.unwrap();

    assert!(engine.has_worker());
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(live.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reconfigure_disposes_before_the_next_worker() {
    let (mut engine, live, created) = engine(OcrOptions::new("eng", true));
    engine.recognize_bitmap(&png()).await.unwrap();

    engine.reconfigure(OcrOptions::new("deu", false));
    assert!(!engine.has_worker());
    assert_eq!(live.load(Ordering::SeqCst), 0);

    let reply = engine.recognize_bitmap(&png()).await.unwrap();
    assert_eq!(reply, EngineReply::Text("deu/auto".to_string()));
    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_eq!(live.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reconfigure_with_same_options_keeps_worker() {
    let (mut engine, _live, created) = engine(OcrOptions::new("eng", true));
    engine.recognize_bitmap(&png()).await.unwrap();

    engine.reconfigure(OcrOptions::new("eng", true));
    assert!(engine.has_worker());
    engine.recognize_bitmap(&png()).await.unwrap();
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn accepts_data_urls_and_raw_bytes() {
    let (engine, _live, _created) = engine(OcrOptions::default());
    let image = png();

    let from_url = engine
        .recognize_source(ImageSource::DataUrl(image.to_data_url()))
        .await
        .unwrap();
    let from_bytes = engine
        .recognize_source(ImageSource::Bytes(image.data.clone()))
        .await
        .unwrap();
    assert_eq!(from_url, "eng/block");
    assert_eq!(from_bytes, "eng/block");
}

#[tokio::test]
async fn bad_data_url_is_rejected_before_ocr() {
    let (engine, _live, created) = engine(OcrOptions::default());
    let err = engine
        .recognize_source(ImageSource::DataUrl("not-a-data-url".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, RecognitionError::InvalidImage(_)));
    assert_eq!(created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_language_is_unconfigured() {
    let (engine, _live, created) = engine(OcrOptions::new("  ", true));
    assert!(!engine.is_configured());
    let err = engine.recognize_bitmap(&png()).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Configuration(_)));
    assert_eq!(created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn factory_failure_surfaces_and_allows_retry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let a = attempts.clone();
    let engine = LocalOcrEngine::with_factory(OcrOptions::default(), move || {
        if a.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(RecognitionError::Configuration("tesseract missing".to_string()))
        } else {
            Ok(Box::new(|_: &[u8], _: &OcrOptions| Ok::<_, RecognitionError>("late".to_string())) as Box<dyn RasterOcr>)
        }
    });

    assert!(engine.recognize_bitmap(&png()).await.is_err());
    assert!(!engine.has_worker());
    let reply = engine.recognize_bitmap(&png()).await.unwrap();
    assert_eq!(reply, EngineReply::Text("late".to_string()));
}
