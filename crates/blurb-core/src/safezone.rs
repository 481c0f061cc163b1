//! Safe text zone computation.
//!
//! The safe zone is the sub-region of a bubble's bounding box guaranteed
//! to lie inside its outline. Rectangular kinds use closed-form fractions
//! of the bounding box; the irregular kinds (Thought, Shout) sample the
//! generated outline and report per-scanline horizontal extents. Both
//! strategies are conservative — the fitter and the layout engine rely on
//! that to prevent visible overflow.

use crate::model::{Bubble, BubbleKind, PathCmd};
use crate::shape::generate_shape;

/// Evenly spaced perimeter samples taken from the flattened outline.
/// Empirically chosen; accuracy/speed tunable.
pub const PERIMETER_SAMPLES: usize = 100;

/// Number of scanline rows sampled across the bubble height.
pub const SCANLINE_ROWS: usize = 24;

/// Fraction removed from each sampled row extent as a safety margin.
const SAMPLED_SHRINK: f32 = 0.30;

/// Subdivision steps when flattening a quadratic segment.
const QUAD_STEPS: usize = 8;

// ─── Closed form ─────────────────────────────────────────────────────────

/// Fraction of the bounding box usable for text, per kind.
fn text_factors(kind: BubbleKind) -> (f32, f32) {
    match kind {
        BubbleKind::SpeechDown | BubbleKind::SpeechUp | BubbleKind::Whisper => (0.80, 0.70),
        BubbleKind::Descriptive => (0.90, 0.85),
        BubbleKind::TextOnly => (0.92, 0.90),
        BubbleKind::Thought => (0.52, 0.52),
        BubbleKind::Shout => (0.42, 0.42),
    }
}

/// The rectangular text region centered inside a bubble's bounding box,
/// in bubble-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub width: f32,
    pub height: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// Closed-form safe zone for a bubble.
pub fn compute_safe_zone(bubble: &Bubble) -> SafeZone {
    let (wf, hf) = text_factors(bubble.kind);
    let width = bubble.width * wf;
    let height = bubble.height * hf;
    SafeZone {
        width,
        height,
        x_offset: (bubble.width - width) / 2.0,
        y_offset: (bubble.height - height) / 2.0,
    }
}

// ─── Per-row extents ─────────────────────────────────────────────────────

/// Maximum usable text width as a function of bubble-local `y`.
#[derive(Debug, Clone, PartialEq)]
pub enum TextExtent {
    /// Constant across all rows (closed-form kinds).
    Uniform(f32),
    /// Sampled rows from `top`, spaced `step` apart. Queries between
    /// samples get the nearest row's value — no interpolation.
    Rows { top: f32, step: f32, widths: Vec<f32> },
}

impl TextExtent {
    /// Usable width at local `y`.
    pub fn at(&self, y: f32) -> f32 {
        match self {
            TextExtent::Uniform(w) => *w,
            TextExtent::Rows { top, step, widths } => {
                if widths.is_empty() || *step <= 0.0 {
                    return 0.0;
                }
                let idx = ((y - top) / step).round() as isize;
                let idx = idx.clamp(0, widths.len() as isize - 1) as usize;
                widths[idx]
            }
        }
    }
}

/// Build the extent function for a bubble. Irregular silhouettes get the
/// sampled per-row variant; everything else is uniform.
pub fn text_extent(bubble: &Bubble) -> TextExtent {
    if bubble.kind.is_seeded() {
        sampled_extent(bubble)
    } else {
        TextExtent::Uniform(compute_safe_zone(bubble).width)
    }
}

fn sampled_extent(bubble: &Bubble) -> TextExtent {
    let spec = generate_shape(bubble);
    let perimeter = resample_perimeter(&spec.outline, PERIMETER_SAMPLES);
    if perimeter.len() < 3 {
        // Degenerate outline: fall back to the closed-form zone.
        return TextExtent::Uniform(compute_safe_zone(bubble).width);
    }

    let step = bubble.height / SCANLINE_ROWS as f32;
    let top = step / 2.0;
    let max = bubble.width;

    let widths = (0..SCANLINE_ROWS)
        .map(|row| {
            let y = top + row as f32 * step;
            row_extent(&perimeter, y).map_or(0.0, |(min_x, max_x)| {
                ((max_x - min_x) * (1.0 - SAMPLED_SHRINK)).clamp(0.0, max)
            })
        })
        .collect();

    TextExtent::Rows { top, step, widths }
}

/// Extreme crossings of the horizontal line `y = target` with the closed
/// polyline, by linear interpolation between straddling samples.
fn row_extent(points: &[(f32, f32)], target: f32) -> Option<(f32, f32)> {
    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    let n = points.len();
    for i in 0..n {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % n];
        if (y0 - target) * (y1 - target) > 0.0 {
            continue; // both on the same side
        }
        if (y1 - y0).abs() < f32::EPSILON {
            // Horizontal run on the scanline: take both endpoints.
            min_x = min_x.min(x0.min(x1));
            max_x = max_x.max(x0.max(x1));
            continue;
        }
        let t = (target - y0) / (y1 - y0);
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let x = x0 + t * (x1 - x0);
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    (min_x <= max_x).then_some((min_x, max_x))
}

// ─── Path flattening ─────────────────────────────────────────────────────

/// Flatten the outline into a dense polyline, then resample `n` evenly
/// spaced points along its arc length.
fn resample_perimeter(outline: &[PathCmd], n: usize) -> Vec<(f32, f32)> {
    let dense = flatten(outline);
    if dense.len() < 2 || n == 0 {
        return dense;
    }

    // Cumulative arc length over the closed polyline.
    let mut lengths = Vec::with_capacity(dense.len() + 1);
    lengths.push(0.0f32);
    let mut total = 0.0f32;
    for i in 0..dense.len() {
        let (x0, y0) = dense[i];
        let (x1, y1) = dense[(i + 1) % dense.len()];
        total += ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        lengths.push(total);
    }
    if total <= 0.0 {
        return dense;
    }

    let mut out = Vec::with_capacity(n);
    let mut seg = 0usize;
    for k in 0..n {
        let target = k as f32 / n as f32 * total;
        while seg + 1 < lengths.len() - 1 && lengths[seg + 1] < target {
            seg += 1;
        }
        let seg_len = lengths[seg + 1] - lengths[seg];
        let t = if seg_len > 0.0 {
            (target - lengths[seg]) / seg_len
        } else {
            0.0
        };
        let (x0, y0) = dense[seg];
        let (x1, y1) = dense[(seg + 1) % dense.len()];
        out.push((x0 + t * (x1 - x0), y0 + t * (y1 - y0)));
    }
    out
}

fn flatten(outline: &[PathCmd]) -> Vec<(f32, f32)> {
    let mut pts: Vec<(f32, f32)> = Vec::new();
    let mut cursor = (0.0f32, 0.0f32);
    for cmd in outline {
        match *cmd {
            PathCmd::MoveTo(x, y) => {
                cursor = (x, y);
                pts.push(cursor);
            }
            PathCmd::LineTo(x, y) => {
                cursor = (x, y);
                pts.push(cursor);
            }
            PathCmd::QuadTo(cx, cy, ex, ey) => {
                for s in 1..=QUAD_STEPS {
                    let t = s as f32 / QUAD_STEPS as f32;
                    let mt = 1.0 - t;
                    let x = mt * mt * cursor.0 + 2.0 * mt * t * cx + t * t * ex;
                    let y = mt * mt * cursor.1 + 2.0 * mt * t * cy + t * t * ey;
                    pts.push((x, y));
                }
                cursor = (ex, ey);
            }
            PathCmd::Close => {}
        }
    }
    pts
}
