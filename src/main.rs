//! Command-line recognizer for recorded ink.
//!
//! Replays a stroke file through the capture engine, then runs the same
//! recognition path an interactive host would.
//!
//! Usage:
//!   ink-recognize <strokes.json>                  Default engine from settings
//!   ink-recognize <strokes.json> --local          Force local OCR
//!   ink-recognize <strokes.json> --no-fallback    Surface stroke errors directly
//!   ink-recognize <strokes.json> --png out.png    Also write the binarized bitmap
//!
//! The stroke file is a JSON array of strokes, each an array of
//! `{x, y, t, p?}` points in logical pixels.

use ink_ocr_lib::capture::{PointerEvent, StrokeCapture, StrokeSet};
use ink_ocr_lib::config::{self, EngineKind};
use ink_ocr_lib::raster;
use ink_ocr_lib::surface::{CanvasSurface, StrokeStyle};
use ink_ocr_lib::Recognizer;
use std::path::{Path, PathBuf};

/// Blank space kept right and below the ink when sizing the replay surface.
const SURFACE_MARGIN: f64 = 40.0;

struct Args {
    strokes: PathBuf,
    local: bool,
    no_fallback: bool,
    png: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut strokes = None;
    let mut local = false;
    let mut no_fallback = false;
    let mut png = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--local" => local = true,
            "--no-fallback" => no_fallback = true,
            "--png" => {
                let path = args.next().ok_or("--png needs an output path")?;
                png = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown flag: {}", flag)),
            path => strokes = Some(PathBuf::from(path)),
        }
    }

    Ok(Args {
        strokes: strokes.ok_or("Missing stroke file")?,
        local,
        no_fallback,
        png,
    })
}

fn load_strokes(path: &Path) -> Result<StrokeSet, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid stroke file {}: {}", path.display(), e))
}

/// Feed recorded strokes back through a fresh capture session.
fn replay(strokes: &StrokeSet, pen_width: f64) -> StrokeCapture {
    let (width, height) = strokes
        .bounds()
        .map(|(_, _, max_x, max_y)| (max_x + SURFACE_MARGIN, max_y + SURFACE_MARGIN))
        .unwrap_or((SURFACE_MARGIN, SURFACE_MARGIN));
    let surface = CanvasSurface::with_style(
        width,
        height,
        1.0,
        StrokeStyle {
            line_width: pen_width,
            ..StrokeStyle::default()
        },
    );

    let mut capture = StrokeCapture::new(surface);

    let mut clock = 0.0;
    for stroke in strokes.strokes() {
        // Pressure is a per-stroke property of the recording.
        capture.set_pressure_recording(stroke.first().p.is_some());
        let points = stroke.points();
        for (i, point) in points.iter().enumerate() {
            let at = clock + point.t as f64;
            let event = match i {
                0 => PointerEvent::down(point.x, point.y, at),
                _ => PointerEvent::moved(point.x, point.y, at),
            };
            let event = match point.p {
                Some(p) => event.with_pressure(p),
                None => event,
            };
            capture.handle(&event);
        }
        let last = stroke.last();
        let end = clock + last.t as f64;
        capture.handle(&PointerEvent::up(last.x, last.y, end));
        clock = end + 1.0;
    }
    capture
}

async fn run(args: Args) -> Result<String, String> {
    let settings = config::load_settings();
    let strokes = load_strokes(&args.strokes)?;
    log::info!(
        "[CAPTURE] Loaded {} strokes ({} points) from {}",
        strokes.len(),
        strokes.point_count(),
        args.strokes.display()
    );

    let capture = replay(&strokes, settings.pen_width);

    let mut options = settings.recognize_options();
    if args.no_fallback {
        options.fallback_to_bitmap = false;
    }

    if let Some(path) = &args.png {
        let image = raster::render(capture.surface(), &options.raster).map_err(|e| e.to_string())?;
        std::fs::write(path, &image.data)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        eprintln!("Wrote {}x{} bitmap to {}", image.width, image.height, path.display());
    }

    let recognizer = Recognizer::from_settings(&settings);
    let engine = if args.local {
        EngineKind::Local
    } else {
        recognizer.default_engine()
    };

    recognizer
        .recognize(capture.input(), engine, &options)
        .await
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    if let Ok(cwd) = std::env::current_dir() {
        config::load_env(&cwd);
    }
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage:");
            eprintln!("  ink-recognize <strokes.json> [--local] [--no-fallback] [--png out.png]");
            std::process::exit(1);
        }
    };

    match run(args).await {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Recognition failed: {}", e);
            std::process::exit(1);
        }
    }
}
