//! Drawing surface the canvas strokes are rendered onto.
//!
//! The surface owns a white RGBA backing store sized `logical × dpr`.
//! Callers always speak logical (CSS) pixels; the surface absorbs the
//! device pixel ratio so stroke data stays resolution-independent.

mod draw;

use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Pen style applied to every segment drawn on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeStyle {
    /// Base line width in logical pixels. Pressure scales it per segment.
    pub line_width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub color: [u8; 4],
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            cap: LineCap::Round,
            join: LineJoin::Round,
            color: [0, 0, 0, 255],
        }
    }
}

/// A DPR-aware drawing surface.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    pixels: RgbaImage,
    logical_width: f64,
    logical_height: f64,
    device_pixel_ratio: f64,
    /// Top-left of the surface's bounding rectangle in client coordinates.
    origin: (f64, f64),
    style: StrokeStyle,
    has_ink: bool,
}

impl CanvasSurface {
    pub fn new(logical_width: f64, logical_height: f64, device_pixel_ratio: f64) -> Self {
        Self::with_style(
            logical_width,
            logical_height,
            device_pixel_ratio,
            StrokeStyle::default(),
        )
    }

    pub fn with_style(
        logical_width: f64,
        logical_height: f64,
        device_pixel_ratio: f64,
        style: StrokeStyle,
    ) -> Self {
        let dpr = sanitize_dpr(device_pixel_ratio);
        let (w, h) = backing_size(logical_width, logical_height, dpr);
        Self {
            pixels: RgbaImage::from_pixel(w, h, WHITE),
            logical_width: logical_width.max(0.0),
            logical_height: logical_height.max(0.0),
            device_pixel_ratio: dpr,
            origin: (0.0, 0.0),
            style,
            has_ink: false,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Direct pixel access for hosts that paint onto the surface themselves.
    /// Counts as ink.
    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        self.has_ink = true;
        &mut self.pixels
    }

    pub fn logical_size(&self) -> (f64, f64) {
        (self.logical_width, self.logical_height)
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Record where the surface sits in client coordinates.
    pub fn set_origin(&mut self, left: f64, top: f64) {
        self.origin = (left, top);
    }

    /// Map client pointer coordinates to surface-local logical coordinates.
    pub fn to_local(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (client_x - self.origin.0, client_y - self.origin.1)
    }

    /// Whether the surface has been laid out with a non-zero area.
    pub fn is_laid_out(&self) -> bool {
        self.pixels.width() > 0 && self.pixels.height() > 0
    }

    /// Whether anything has been drawn since the last clear.
    pub fn has_ink(&self) -> bool {
        self.has_ink
    }

    /// Wipe to white.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = WHITE;
        }
        self.has_ink = false;
    }

    /// Draw a filled dot of diameter `width` at a logical point.
    pub fn draw_dot(&mut self, at: (f64, f64), width: f64) {
        let center = self.to_backing(at);
        let radius = width * self.device_pixel_ratio / 2.0;
        let color = Rgba(self.style.color);
        draw::stroke_segment(&mut self.pixels, center, center, radius, LineCap::Round, color);
        self.has_ink = true;
    }

    /// Draw a line segment of `width` between two logical points.
    pub fn draw_segment(&mut self, from: (f64, f64), to: (f64, f64), width: f64) {
        let a = self.to_backing(from);
        let b = self.to_backing(to);
        let radius = width * self.device_pixel_ratio / 2.0;
        let color = Rgba(self.style.color);
        if self.style.join == LineJoin::Round && self.style.cap != LineCap::Round {
            draw::stroke_segment(&mut self.pixels, a, a, radius, LineCap::Round, color);
        }
        draw::stroke_segment(&mut self.pixels, a, b, radius, self.style.cap, color);
        self.has_ink = true;
    }

    /// Resize the surface, keeping what has been drawn.
    ///
    /// The old backing store is snapshotted, a new one allocated at the new
    /// DPR-scaled size and filled white, and the snapshot stretched into it.
    pub fn resize(&mut self, logical_width: f64, logical_height: f64, device_pixel_ratio: f64) {
        let dpr = sanitize_dpr(device_pixel_ratio);
        let (w, h) = backing_size(logical_width, logical_height, dpr);
        let snapshot = std::mem::replace(&mut self.pixels, RgbaImage::from_pixel(w, h, WHITE));

        self.logical_width = logical_width.max(0.0);
        self.logical_height = logical_height.max(0.0);
        self.device_pixel_ratio = dpr;

        if snapshot.width() > 0 && snapshot.height() > 0 && w > 0 && h > 0 {
            let scaled = if snapshot.dimensions() == (w, h) {
                snapshot
            } else {
                imageops::resize(&snapshot, w, h, imageops::FilterType::Triangle)
            };
            imageops::overlay(&mut self.pixels, &scaled, 0, 0);
        }

        log::debug!(
            "[SURFACE] Resized to {}x{} logical @{}x ({}x{} backing)",
            self.logical_width,
            self.logical_height,
            dpr,
            w,
            h
        );
    }

    fn to_backing(&self, p: (f64, f64)) -> (f64, f64) {
        (p.0 * self.device_pixel_ratio, p.1 * self.device_pixel_ratio)
    }
}

fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        1.0
    }
}

fn backing_size(logical_width: f64, logical_height: f64, dpr: f64) -> (u32, u32) {
    let w = (logical_width.max(0.0) * dpr).round() as u32;
    let h = (logical_height.max(0.0) * dpr).round() as u32;
    (w, h)
}
