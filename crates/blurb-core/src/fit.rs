//! Auto-fit font-size search.
//!
//! Walks candidate sizes downward until the plain-text word-wrapped block
//! fits the bubble's closed-form safe zone. Deliberately a linear search:
//! the iteration budget is tiny and stepping by 1 favors the smallest
//! visual change over speed.

use crate::markup::Document;
use crate::model::Bubble;
use crate::safezone::compute_safe_zone;
use crate::text::{TextMeasurer, TextStyle, block_height, block_width, layout_text};

pub const DEFAULT_MIN_FONT_SIZE: f32 = 8.0;
pub const DEFAULT_MAX_FONT_SIZE: f32 = 40.0;
const MAX_ITERATIONS: u32 = 20;

/// Outcome of a fit search. Never an error: when no size in range fits,
/// the floor size comes back with `fits = false` and the caller renders
/// the best effort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub font_size: f32,
    pub fits: bool,
    pub text_width: f32,
    pub text_height: f32,
    /// `font_size` relative to the bubble's requested size.
    pub scale_factor: f32,
}

/// Find the largest font size ≤ `max` (and ≤ the bubble's own size) whose
/// wrapped block fits the safe zone, stopping at `min`.
pub fn fit_font_size(
    text: &str,
    bubble: &Bubble,
    font_family: &str,
    min: f32,
    max: f32,
    measurer: &dyn TextMeasurer,
) -> FitResult {
    let zone = compute_safe_zone(bubble);
    let doc = Document::plain(text);
    let base = bubble.font_size.max(1.0);

    let mut size = bubble.font_size.min(max);
    for _ in 0..MAX_ITERATIONS {
        if size < min {
            break;
        }
        let (w, h) = measure_block(&doc, font_family, size, zone.width, measurer);
        if w <= zone.width && h <= zone.height {
            return FitResult {
                font_size: size,
                fits: true,
                text_width: w,
                text_height: h,
                scale_factor: size / base,
            };
        }
        size -= 1.0;
    }

    // Exhausted: report the floor size as a best effort.
    let (w, h) = measure_block(&doc, font_family, min, zone.width, measurer);
    FitResult {
        font_size: min,
        fits: false,
        text_width: w,
        text_height: h,
        scale_factor: min / base,
    }
}

fn measure_block(
    doc: &Document,
    font_family: &str,
    size: f32,
    max_width: f32,
    measurer: &dyn TextMeasurer,
) -> (f32, f32) {
    let style = TextStyle::new(font_family, size, crate::model::Color::BLACK);
    let lines = layout_text(doc, &style, max_width, None, 0.0, measurer);
    (block_width(&lines), block_height(&lines))
}
