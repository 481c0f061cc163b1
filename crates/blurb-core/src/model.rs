//! Core data model for bubble overlays.
//!
//! A document is a flat, z-ordered list of `Bubble` values placed over a
//! background image. Each bubble owns its attached `Part`s (a speech tail
//! or thought dots) as plain values — interaction code replaces bubbles
//! wholesale rather than mutating them in place, which is what keeps
//! recomputation of shape/layout safe without any synchronization.

use crate::id::BubbleId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Bubbles can never shrink below this footprint; resize and load paths
/// clamp rather than fail.
pub const MIN_BUBBLE_WIDTH: f32 = 40.0;
pub const MIN_BUBBLE_HEIGHT: f32 = 30.0;

/// A tail base point counts as lying on an edge when its coordinate is
/// within this distance of 0 / width / height.
pub const EDGE_EPS: f32 = 0.5;

/// Smallest rendered thought-dot diameter after rescaling.
pub const MIN_DOT_SIZE: f32 = 2.0;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 | 8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = if bytes.len() == 8 {
                    hex_val(bytes[6])? << 4 | hex_val(bytes[7])?
                } else {
                    255
                };
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB` (or `#RRGGBBAA` when not fully opaque).
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Path commands ───────────────────────────────────────────────────────

/// A single outline command (SVG-like but simplified). Coordinates are in
/// the bubble's local (0..width, 0..height) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32), // control, end
    Close,
}

// ─── Bubble kinds ────────────────────────────────────────────────────────

/// The bubble silhouettes the generator knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BubbleKind {
    /// Pill speech bubble, tail defaulting to the bottom edge.
    SpeechDown,
    /// Pill speech bubble, tail defaulting to the top edge.
    SpeechUp,
    /// Cloud of quadratic lobes with a run of trailing dots.
    Thought,
    /// Spiky star burst.
    Shout,
    /// Plain rounded-rect caption box.
    Descriptive,
    /// Pill with a dashed border, tail allowed.
    Whisper,
    /// No outline at all — free-floating text.
    TextOnly,
}

impl BubbleKind {
    /// Only the pill-shaped kinds may carry a speech tail.
    pub fn allows_tail(&self) -> bool {
        matches!(
            self,
            BubbleKind::SpeechDown | BubbleKind::SpeechUp | BubbleKind::Whisper
        )
    }

    /// Only thought bubbles carry dot parts.
    pub fn allows_dots(&self) -> bool {
        matches!(self, BubbleKind::Thought)
    }

    pub fn has_outline(&self) -> bool {
        !matches!(self, BubbleKind::TextOnly)
    }

    /// Whether the silhouette is randomized per (id, variant) seed.
    pub fn is_seeded(&self) -> bool {
        matches!(self, BubbleKind::Thought | BubbleKind::Shout)
    }
}

// ─── Parts ───────────────────────────────────────────────────────────────

/// An attached sub-shape belonging to a bubble. A closed sum type — the
/// renderer and the gesture engine dispatch on the discriminant and no
/// third implicit shape exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Part {
    /// Speech tail: base segment on the bubble perimeter, free tip.
    /// All coordinates are bubble-local; the tip may lie outside the
    /// bubble rectangle.
    Tail {
        base_cx: f32,
        base_cy: f32,
        base_width: f32,
        tip_x: f32,
        tip_y: f32,
        /// Geometry remembered at creation, so repeated rescaling stays
        /// consistent instead of compounding.
        initial_length: f32,
        initial_base_width: f32,
    },
    /// Thought dot: a filled circle at a local offset. `size` is the
    /// diameter. Dots are created largest-first so the run tapers toward
    /// the speaker (smallest-last by convention, not enforced).
    Dot { offset_x: f32, offset_y: f32, size: f32 },
}

impl Part {
    pub fn is_tail(&self) -> bool {
        matches!(self, Part::Tail { .. })
    }

    pub fn is_dot(&self) -> bool {
        matches!(self, Part::Dot { .. })
    }

    /// Build a tail, deriving the remembered initial geometry from the
    /// base→tip vector.
    pub fn new_tail(base_cx: f32, base_cy: f32, base_width: f32, tip_x: f32, tip_y: f32) -> Self {
        let len = ((tip_x - base_cx).powi(2) + (tip_y - base_cy).powi(2)).sqrt();
        Part::Tail {
            base_cx,
            base_cy,
            base_width,
            tip_x,
            tip_y,
            initial_length: len,
            initial_base_width: base_width,
        }
    }
}

// ─── Bubble ──────────────────────────────────────────────────────────────

/// One placed dialogue/caption shape with text and styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: BubbleId,
    pub kind: BubbleKind,

    /// Styled markup, see `markup` for the syntax.
    pub text: String,

    /// Canvas-space position of the bubble's top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub font_family: String,
    pub font_size: f32,
    pub text_color: Color,
    pub border_color: Color,

    /// Stacking order; higher paints later (on top).
    pub z_index: i32,

    /// Attached tail / dots. At most one tail; contents constrained by
    /// `kind` (see `sanitize`).
    pub parts: SmallVec<[Part; 4]>,

    /// Selects among randomized silhouettes for seeded kinds. Ignored by
    /// the rectangular kinds.
    pub shape_variant: u32,
}

impl Bubble {
    pub fn new(id: BubbleId, kind: BubbleKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            kind,
            text: String::new(),
            x,
            y,
            width: width.max(MIN_BUBBLE_WIDTH),
            height: height.max(MIN_BUBBLE_HEIGHT),
            font_family: "Arial".into(),
            font_size: 16.0,
            text_color: Color::BLACK,
            border_color: Color::BLACK,
            z_index: 0,
            parts: SmallVec::new(),
            shape_variant: 0,
        }
    }

    /// The combined integer seed driving the silhouette PRNG. Wrapping
    /// arithmetic: loaded ids are unconstrained u64s, and the seed only
    /// has to be stable and portable, not ordered.
    pub fn shape_seed(&self) -> u64 {
        self.id
            .raw()
            .wrapping_mul(1000)
            .wrapping_add(self.shape_variant as u64)
    }

    /// The bubble's tail part, if any.
    pub fn tail(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.is_tail())
    }

    /// All dot parts in document order.
    pub fn dots(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_dot())
    }

    /// Clamp width/height to the minimums. Invalid geometry is recovered,
    /// never rejected — the editor must always render something.
    pub fn clamp_size(&mut self) {
        if self.width < MIN_BUBBLE_WIDTH || !self.width.is_finite() {
            log::warn!("bubble {} width {} clamped", self.id, self.width);
            self.width = MIN_BUBBLE_WIDTH;
        }
        if self.height < MIN_BUBBLE_HEIGHT || !self.height.is_finite() {
            log::warn!("bubble {} height {} clamped", self.id, self.height);
            self.height = MIN_BUBBLE_HEIGHT;
        }
    }

    /// Enforce the part invariants for this bubble's kind: drop parts the
    /// kind does not support and keep only the first tail. Used on project
    /// load so any producer's record is accepted.
    pub fn sanitize(&mut self) {
        self.clamp_size();
        let kind = self.kind;
        let mut seen_tail = false;
        let before = self.parts.len();
        self.parts.retain(|p| match p {
            Part::Tail { .. } => {
                let keep = kind.allows_tail() && !seen_tail;
                seen_tail |= keep;
                keep
            }
            Part::Dot { .. } => kind.allows_dots(),
        });
        if self.parts.len() != before {
            log::warn!(
                "bubble {}: dropped {} part(s) unsupported by {:?}",
                self.id,
                before - self.parts.len(),
                kind
            );
        }
    }

    /// Does `(px, py)` in canvas space fall inside the bounding box?
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

// ─── Tool settings ───────────────────────────────────────────────────────

/// Process-wide defaults applied when instantiating new bubbles. Created
/// once at startup, mutated by toolbar actions, never persisted inside a
/// `Bubble`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub active_kind: BubbleKind,
    pub font_family: String,
    pub font_size: f32,
    pub text_color: Color,
    pub border_color: Color,
    /// Default distance from tail base to tip for new tails.
    pub tail_length: f32,
    pub tail_base_width: f32,
    /// Diameters for the default thought-dot run, largest first.
    pub dot_sizes: [f32; 3],
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            active_kind: BubbleKind::SpeechDown,
            font_family: "Arial".into(),
            font_size: 16.0,
            text_color: Color::BLACK,
            border_color: Color::BLACK,
            tail_length: 30.0,
            tail_base_width: 20.0,
            dot_sizes: [14.0, 10.0, 6.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_roundtrip() {
        let c = Color::from_hex("#FF8800").unwrap();
        assert_eq!(c.to_hex(), "#FF8800");
        let c = Color::from_hex("1A2B3C4D").unwrap();
        assert_eq!(c.to_hex(), "#1A2B3C4D");
    }

    #[test]
    fn hex_short_form_expands() {
        let c = Color::from_hex("#F00").unwrap();
        assert_eq!(c.to_hex(), "#FF0000");
    }

    #[test]
    fn hex_rejects_garbage() {
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::from_hex("#12345"), None);
    }

    #[test]
    fn new_bubble_clamps_to_minimums() {
        let b = Bubble::new(BubbleId::next(), BubbleKind::SpeechDown, 0.0, 0.0, 5.0, 5.0);
        assert_eq!(b.width, MIN_BUBBLE_WIDTH);
        assert_eq!(b.height, MIN_BUBBLE_HEIGHT);
    }

    #[test]
    fn sanitize_drops_illegal_parts() {
        let mut b = Bubble::new(BubbleId::next(), BubbleKind::Descriptive, 0.0, 0.0, 100.0, 60.0);
        b.parts.push(Part::new_tail(50.0, 60.0, 20.0, 50.0, 90.0));
        b.parts.push(Part::Dot {
            offset_x: 10.0,
            offset_y: 10.0,
            size: 8.0,
        });
        b.sanitize();
        assert!(b.parts.is_empty(), "descriptive bubbles carry no parts");
    }

    #[test]
    fn sanitize_keeps_single_tail() {
        let mut b = Bubble::new(BubbleId::next(), BubbleKind::SpeechDown, 0.0, 0.0, 100.0, 60.0);
        b.parts.push(Part::new_tail(50.0, 60.0, 20.0, 50.0, 90.0));
        b.parts.push(Part::new_tail(20.0, 60.0, 20.0, 20.0, 90.0));
        b.sanitize();
        assert_eq!(b.parts.len(), 1);
        match b.parts[0] {
            Part::Tail { base_cx, .. } => assert_eq!(base_cx, 50.0),
            _ => panic!("expected the first tail to survive"),
        }
    }

    #[test]
    fn tail_initial_geometry_derived() {
        let t = Part::new_tail(75.0, 90.0, 20.0, 75.0, 120.0);
        match t {
            Part::Tail {
                initial_length,
                initial_base_width,
                ..
            } => {
                assert!((initial_length - 30.0).abs() < 1e-4);
                assert_eq!(initial_base_width, 20.0);
            }
            _ => unreachable!(),
        }
    }
}
