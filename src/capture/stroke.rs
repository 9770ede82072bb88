//! Stroke data model: points, sealed strokes, and the per-session set.

use serde::{Deserialize, Serialize};

/// Pressure recorded when the device reports none (or reports zero).
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// One sample of a stroke, in logical surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the stroke began.
    pub t: u64,
    /// Pen pressure in `[0, 1]`, if it was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, t: u64, p: Option<f64>) -> Self {
        Self { x, y, t, p }
    }
}

/// Normalize a device pressure reading: missing or zero becomes 0.5.
pub fn normalize_pressure(raw: Option<f64>) -> f64 {
    match raw {
        Some(p) if p.is_finite() && p > 0.0 => p.min(1.0),
        _ => DEFAULT_PRESSURE,
    }
}

/// An ordered, never-empty run of points from one pen-down to pen-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StrokePoint>", into = "Vec<StrokePoint>")]
pub struct Stroke {
    points: Vec<StrokePoint>,
}

impl Stroke {
    /// Start a stroke at its first point.
    pub fn begin(first: StrokePoint) -> Self {
        Self {
            points: vec![first],
        }
    }

    /// Append a point, keeping timestamps non-decreasing.
    pub(crate) fn push(&mut self, mut point: StrokePoint) {
        if let Some(last) = self.points.last() {
            point.t = point.t.max(last.t);
        }
        self.points.push(point);
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn first(&self) -> &StrokePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &StrokePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.points.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }
}

impl TryFrom<Vec<StrokePoint>> for Stroke {
    type Error = String;

    fn try_from(points: Vec<StrokePoint>) -> Result<Self, Self::Error> {
        let mut iter = points.into_iter();
        let first = iter.next().ok_or("a stroke needs at least one point")?;
        let mut stroke = Stroke::begin(first);
        for point in iter {
            stroke.push(point);
        }
        Ok(stroke)
    }
}

impl From<Stroke> for Vec<StrokePoint> {
    fn from(stroke: Stroke) -> Self {
        stroke.points
    }
}

/// All sealed strokes from one capture session, in the order drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeSet {
    strokes: Vec<Stroke>,
}

impl StrokeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Bounds over every stroke, or `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.strokes
            .iter()
            .map(Stroke::bounds)
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }
}

impl FromIterator<Stroke> for StrokeSet {
    fn from_iter<I: IntoIterator<Item = Stroke>>(iter: I) -> Self {
        Self {
            strokes: iter.into_iter().collect(),
        }
    }
}
