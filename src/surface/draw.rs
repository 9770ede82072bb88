//! Pixel-level stroke rendering into the backing store.
//!
//! Coordinates here are backing-store pixels; the surface converts from
//! logical space before calling in. Edges get one pixel of coverage-based
//! anti-aliasing, which the rasterizer's binarization later removes.

use image::{Rgba, RgbaImage};

use super::LineCap;

/// Paint a segment from `a` to `b` with the given half-width.
///
/// `Round` caps produce a capsule (and a disc when `a == b`), `Butt` stops
/// flush at the endpoints, `Square` extends the segment by `radius` first.
pub(crate) fn stroke_segment(
    pixels: &mut RgbaImage,
    a: (f64, f64),
    b: (f64, f64),
    radius: f64,
    cap: LineCap,
    color: Rgba<u8>,
) {
    if pixels.width() == 0 || pixels.height() == 0 || radius <= 0.0 {
        return;
    }

    let (a, b) = match cap {
        LineCap::Square => extend(a, b, radius),
        _ => (a, b),
    };
    let round = cap == LineCap::Round || a == b;

    let reach = radius + 1.0;
    let min_x = (a.0.min(b.0) - reach).floor().max(0.0) as u32;
    let min_y = (a.1.min(b.1) - reach).floor().max(0.0) as u32;
    let max_x = ((a.0.max(b.0) + reach).ceil() as i64).min(pixels.width() as i64 - 1);
    let max_y = ((a.1.max(b.1) + reach).ceil() as i64).min(pixels.height() as i64 - 1);
    if max_x < 0 || max_y < 0 {
        return;
    }

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let center = (x as f64 + 0.5, y as f64 + 0.5);
            let dist = match distance_to_segment(center, a, b, round) {
                Some(d) => d,
                None => continue,
            };
            let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend(pixels.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

/// Distance from `p` to segment `ab`. Without round ends, points that
/// project outside the segment get `None`.
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64), round: bool) -> Option<f64> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        let (px, py) = (p.0 - a.0, p.1 - a.1);
        return Some((px * px + py * py).sqrt());
    }

    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq;
    if !round && !(0.0..=1.0).contains(&t) {
        return None;
    }
    let t = t.clamp(0.0, 1.0);
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    let (px, py) = (p.0 - cx, p.1 - cy);
    Some((px * px + py * py).sqrt())
}

fn extend(a: (f64, f64), b: (f64, f64), by: f64) -> ((f64, f64), (f64, f64)) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        return (a, b);
    }
    let (ux, uy) = (dx / len * by, dy / len * by);
    ((a.0 - ux, a.1 - uy), (b.0 + ux, b.1 + uy))
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f64) {
    let alpha = coverage * (src[3] as f64 / 255.0);
    for c in 0..3 {
        let mixed = dst[c] as f64 + (src[c] as f64 - dst[c] as f64) * alpha;
        dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = 255;
}
