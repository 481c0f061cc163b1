//! Bubble silhouette synthesis.
//!
//! Turns a `Bubble` into an outline command list (plus auxiliary circles
//! for thought dots), in bubble-local coordinates. Pure and deterministic:
//! the randomized kinds (Thought, Shout) derive every perturbation from a
//! sine-based PRNG seeded with `(id, shape_variant)`, so the silhouette can
//! be recomputed from scratch on every render instead of cached.

use crate::model::{Bubble, BubbleKind, EDGE_EPS, Part, PathCmd};

/// A filled circle drawn alongside the outline (thought dots).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxCircle {
    /// Index of the originating dot part.
    pub id: usize,
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

/// Generator output: outline + auxiliary circles, both bubble-local.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeSpec {
    pub outline: Vec<PathCmd>,
    pub circles: Vec<AuxCircle>,
}

// ─── Seeded PRNG ─────────────────────────────────────────────────────────

/// Fixed, portable sine-based sequence generator. Not statistically strong
/// and not meant to be: the only requirement is that the same seed always
/// yields the same silhouette, on every platform and test run.
#[derive(Debug, Clone)]
pub struct SilhouetteRng {
    seed: f64,
    n: u32,
}

impl SilhouetteRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: seed as f64,
            n: 0,
        }
    }

    /// Next value in [0, 1).
    pub fn next(&mut self) -> f32 {
        self.n += 1;
        let x = ((self.seed + self.n as f64) * 12.9898).sin() * 43758.5453;
        (x - x.floor()) as f32
    }

    /// Next value in [lo, hi).
    pub fn in_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next() * (hi - lo)
    }
}

// ─── Entry point ─────────────────────────────────────────────────────────

/// Generate the outline and auxiliary circles for a bubble.
pub fn generate_shape(bubble: &Bubble) -> ShapeSpec {
    let (w, h) = (bubble.width, bubble.height);
    match bubble.kind {
        BubbleKind::SpeechDown | BubbleKind::SpeechUp | BubbleKind::Whisper => ShapeSpec {
            outline: pill_outline(w, h, bubble.tail()),
            circles: Vec::new(),
        },
        BubbleKind::Descriptive => ShapeSpec {
            outline: rounded_rect_outline(w, h, 5.0),
            circles: Vec::new(),
        },
        BubbleKind::TextOnly => ShapeSpec::default(),
        BubbleKind::Thought => {
            let mut rng = SilhouetteRng::new(bubble.shape_seed());
            ShapeSpec {
                outline: thought_outline(w, h, &mut rng),
                circles: dot_circles(bubble),
            }
        }
        BubbleKind::Shout => {
            let mut rng = SilhouetteRng::new(bubble.shape_seed());
            ShapeSpec {
                outline: shout_outline(w, h, &mut rng),
                circles: Vec::new(),
            }
        }
    }
}

fn dot_circles(bubble: &Bubble) -> Vec<AuxCircle> {
    bubble
        .dots()
        .enumerate()
        .map(|(i, dot)| match dot {
            Part::Dot {
                offset_x,
                offset_y,
                size,
            } => AuxCircle {
                id: i,
                cx: *offset_x,
                cy: *offset_y,
                radius: size / 2.0,
            },
            Part::Tail { .. } => unreachable!("dots() yields only Dot parts"),
        })
        .collect()
}

// ─── Pill (speech / whisper) ─────────────────────────────────────────────

/// Which rectangle edge a tail base is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TailEdge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Infer the pinned edge from the base point. A base that sits on no edge
/// means the tail is invisible and the outline is a plain pill.
fn tail_edge(base_cx: f32, base_cy: f32, w: f32, h: f32) -> Option<TailEdge> {
    if base_cy.abs() <= EDGE_EPS {
        Some(TailEdge::Top)
    } else if (base_cy - h).abs() <= EDGE_EPS {
        Some(TailEdge::Bottom)
    } else if base_cx.abs() <= EDGE_EPS {
        Some(TailEdge::Left)
    } else if (base_cx - w).abs() <= EDGE_EPS {
        Some(TailEdge::Right)
    } else {
        None
    }
}

/// Rounded "pill" outline (corner radius = min(w,h)/2), with one straight
/// edge replaced by a smooth tail cut when a tail is pinned there.
fn pill_outline(w: f32, h: f32, tail: Option<&Part>) -> Vec<PathCmd> {
    let r = w.min(h) / 2.0;

    let tail_geom = tail.and_then(|t| match t {
        Part::Tail {
            base_cx,
            base_cy,
            base_width,
            tip_x,
            tip_y,
            ..
        } => tail_edge(*base_cx, *base_cy, w, h)
            .map(|edge| (edge, *base_cx, *base_cy, *base_width, *tip_x, *tip_y)),
        Part::Dot { .. } => None,
    });

    let on = |edge: TailEdge| tail_geom.filter(|(e, ..)| *e == edge);

    let mut cmds = Vec::with_capacity(16);
    cmds.push(PathCmd::MoveTo(r, 0.0));

    // Top edge, left → right.
    if let Some((_, cx, _, bw, tx, ty)) = on(TailEdge::Top) {
        tail_cut_h(&mut cmds, cx - bw / 2.0, cx + bw / 2.0, 0.0, tx, ty);
    }
    cmds.push(PathCmd::LineTo(w - r, 0.0));
    cmds.push(PathCmd::QuadTo(w, 0.0, w, r));

    // Right edge, top → bottom.
    if let Some((_, _, cy, bw, tx, ty)) = on(TailEdge::Right) {
        tail_cut_v(&mut cmds, cy - bw / 2.0, cy + bw / 2.0, w, tx, ty);
    }
    cmds.push(PathCmd::LineTo(w, h - r));
    cmds.push(PathCmd::QuadTo(w, h, w - r, h));

    // Bottom edge, right → left.
    if let Some((_, cx, _, bw, tx, ty)) = on(TailEdge::Bottom) {
        tail_cut_h(&mut cmds, cx + bw / 2.0, cx - bw / 2.0, h, tx, ty);
    }
    cmds.push(PathCmd::LineTo(r, h));
    cmds.push(PathCmd::QuadTo(0.0, h, 0.0, h - r));

    // Left edge, bottom → top.
    if let Some((_, _, cy, bw, tx, ty)) = on(TailEdge::Left) {
        tail_cut_v(&mut cmds, cy + bw / 2.0, cy - bw / 2.0, 0.0, tx, ty);
    }
    cmds.push(PathCmd::LineTo(0.0, r));
    cmds.push(PathCmd::QuadTo(0.0, 0.0, r, 0.0));
    cmds.push(PathCmd::Close);
    cmds
}

/// Tail cut on a horizontal edge (y = `edge_y`). `x1` is the base point
/// encountered first in path direction. Each side is a quadratic whose
/// control sits 25% of the way toward the tip along x, with y held at the
/// edge — a smooth trapezoid-to-point cut rather than a sharp notch.
fn tail_cut_h(cmds: &mut Vec<PathCmd>, x1: f32, x2: f32, edge_y: f32, tip_x: f32, tip_y: f32) {
    cmds.push(PathCmd::LineTo(x1, edge_y));
    cmds.push(PathCmd::QuadTo(x1 + 0.25 * (tip_x - x1), edge_y, tip_x, tip_y));
    cmds.push(PathCmd::QuadTo(x2 + 0.25 * (tip_x - x2), edge_y, x2, edge_y));
}

/// Tail cut on a vertical edge (x = `edge_x`). Mirror of `tail_cut_h` with
/// the axes swapped.
fn tail_cut_v(cmds: &mut Vec<PathCmd>, y1: f32, y2: f32, edge_x: f32, tip_x: f32, tip_y: f32) {
    cmds.push(PathCmd::LineTo(edge_x, y1));
    cmds.push(PathCmd::QuadTo(edge_x, y1 + 0.25 * (tip_y - y1), tip_x, tip_y));
    cmds.push(PathCmd::QuadTo(edge_x, y2 + 0.25 * (tip_y - y2), edge_x, y2));
}

// ─── Descriptive ─────────────────────────────────────────────────────────

fn rounded_rect_outline(w: f32, h: f32, radius: f32) -> Vec<PathCmd> {
    let r = radius.min(w / 2.0).min(h / 2.0);
    vec![
        PathCmd::MoveTo(r, 0.0),
        PathCmd::LineTo(w - r, 0.0),
        PathCmd::QuadTo(w, 0.0, w, r),
        PathCmd::LineTo(w, h - r),
        PathCmd::QuadTo(w, h, w - r, h),
        PathCmd::LineTo(r, h),
        PathCmd::QuadTo(0.0, h, 0.0, h - r),
        PathCmd::LineTo(0.0, r),
        PathCmd::QuadTo(0.0, 0.0, r, 0.0),
        PathCmd::Close,
    ]
}

// ─── Thought ─────────────────────────────────────────────────────────────

/// Cloud outline: 7–12 quadratic lobes around an ellipse of radii
/// 0.30·w / 0.30·h, each lobe's control point bulging outward by a
/// seed-derived factor in [1.3, 1.6).
fn thought_outline(w: f32, h: f32, rng: &mut SilhouetteRng) -> Vec<PathCmd> {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (rx, ry) = (0.30 * w, 0.30 * h);
    let lobes = 7 + (rng.next() * 6.0).floor() as u32; // 7..=12

    let point_at = |i: u32| {
        let theta = i as f32 / lobes as f32 * std::f32::consts::TAU;
        (cx + theta.cos() * rx, cy + theta.sin() * ry)
    };

    let (x0, y0) = point_at(0);
    let mut cmds = Vec::with_capacity(lobes as usize + 2);
    cmds.push(PathCmd::MoveTo(x0, y0));

    for i in 0..lobes {
        let bulge = rng.in_range(1.3, 1.6);
        let mid = (i as f32 + 0.5) / lobes as f32 * std::f32::consts::TAU;
        let ctrl_x = cx + mid.cos() * rx * bulge;
        let ctrl_y = cy + mid.sin() * ry * bulge;
        let (ex, ey) = point_at((i + 1) % lobes);
        cmds.push(PathCmd::QuadTo(ctrl_x, ctrl_y, ex, ey));
    }
    cmds.push(PathCmd::Close);
    cmds
}

// ─── Shout ───────────────────────────────────────────────────────────────

/// Star burst: 14 spikes (28 alternating outer/inner points). Outer spikes
/// vary widely for visual energy; inner valleys stay near-regular so the
/// text area is not eaten into.
fn shout_outline(w: f32, h: f32, rng: &mut SilhouetteRng) -> Vec<PathCmd> {
    const POINTS: u32 = 28;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (outer_x, outer_y) = (w / 2.0, h / 2.0);
    let (inner_x, inner_y) = (w / 3.5, h / 3.5);

    let mut cmds = Vec::with_capacity(POINTS as usize + 2);
    for k in 0..POINTS {
        let theta = k as f32 / POINTS as f32 * std::f32::consts::TAU;
        let (ax, ay, factor) = if k % 2 == 0 {
            (outer_x, outer_y, rng.in_range(0.6, 1.4))
        } else {
            (inner_x, inner_y, rng.in_range(0.9, 1.1))
        };
        let px = cx + theta.cos() * ax * factor;
        let py = cy + theta.sin() * ay * factor;
        if k == 0 {
            cmds.push(PathCmd::MoveTo(px, py));
        } else {
            cmds.push(PathCmd::LineTo(px, py));
        }
    }
    cmds.push(PathCmd::Close);
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BubbleId;
    use pretty_assertions::assert_eq;

    fn bubble(kind: BubbleKind, w: f32, h: f32) -> Bubble {
        Bubble::new(BubbleId::from_raw(42), kind, 0.0, 0.0, w, h)
    }

    #[test]
    fn rng_is_reproducible() {
        let mut a = SilhouetteRng::new(7);
        let mut b = SilhouetteRng::new(7);
        for _ in 0..32 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn rng_stays_in_unit_interval() {
        let mut rng = SilhouetteRng::new(99);
        for _ in 0..256 {
            let v = rng.next();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn seeded_shapes_are_deterministic() {
        for kind in [BubbleKind::Thought, BubbleKind::Shout] {
            let b = bubble(kind, 120.0, 80.0);
            assert_eq!(generate_shape(&b), generate_shape(&b));
        }
    }

    #[test]
    fn shout_variants_differ_but_reproduce() {
        let mut a = bubble(BubbleKind::Shout, 120.0, 80.0);
        let mut b = a.clone();
        a.shape_variant = 0;
        b.shape_variant = 1;
        assert_ne!(generate_shape(&a).outline, generate_shape(&b).outline);
        assert_eq!(generate_shape(&a), generate_shape(&a));
        assert_eq!(generate_shape(&b), generate_shape(&b));
    }

    #[test]
    fn huge_loaded_id_still_seeds_a_silhouette() {
        // Project files can carry arbitrary u64 ids; the seed must not
        // overflow when combining them with the variant.
        for kind in [BubbleKind::Thought, BubbleKind::Shout] {
            let mut b = bubble(kind, 120.0, 80.0);
            b.id = BubbleId::from_raw(u64::MAX / 2);
            b.shape_variant = 3;
            let spec = generate_shape(&b);
            assert!(!spec.outline.is_empty());
            assert_eq!(spec, generate_shape(&b));
        }
    }

    #[test]
    fn thought_lobe_count_in_range() {
        for id in 1..40u64 {
            let mut b = bubble(BubbleKind::Thought, 100.0, 80.0);
            b.id = BubbleId::from_raw(id);
            let spec = generate_shape(&b);
            // MoveTo + lobes quads + Close
            let quads = spec
                .outline
                .iter()
                .filter(|c| matches!(c, PathCmd::QuadTo(..)))
                .count();
            assert!((7..=12).contains(&quads), "lobes = {quads}");
        }
    }

    #[test]
    fn shout_has_28_points() {
        let b = bubble(BubbleKind::Shout, 150.0, 100.0);
        let spec = generate_shape(&b);
        let on_curve = spec
            .outline
            .iter()
            .filter(|c| matches!(c, PathCmd::MoveTo(..) | PathCmd::LineTo(..)))
            .count();
        assert_eq!(on_curve, 28);
    }

    #[test]
    fn pill_without_tail_is_plain() {
        let b = bubble(BubbleKind::SpeechDown, 150.0, 90.0);
        let spec = generate_shape(&b);
        // 4 straight edges + 4 corner quads, nothing else
        let quads = spec
            .outline
            .iter()
            .filter(|c| matches!(c, PathCmd::QuadTo(..)))
            .count();
        assert_eq!(quads, 4);
    }

    #[test]
    fn tail_on_bottom_edge_adds_cut() {
        let mut b = bubble(BubbleKind::SpeechDown, 150.0, 90.0);
        b.parts.push(Part::new_tail(75.0, 90.0, 20.0, 75.0, 120.0));
        let spec = generate_shape(&b);
        // Bottom edge runs right→left, so the first base point is x1 = 85;
        // the control sits 25% of the way toward the tip along x.
        assert!(
            spec.outline.contains(&PathCmd::QuadTo(82.5, 90.0, 75.0, 120.0)),
            "first tail quad should reach the tip"
        );
        // Two tail quads on top of the four corner quads.
        let quads = spec
            .outline
            .iter()
            .filter(|c| matches!(c, PathCmd::QuadTo(..)))
            .count();
        assert_eq!(quads, 6);
    }

    #[test]
    fn tail_off_edge_is_invisible() {
        let mut b = bubble(BubbleKind::SpeechDown, 150.0, 90.0);
        b.parts.push(Part::new_tail(75.0, 45.0, 20.0, 75.0, 120.0));
        let spec = generate_shape(&b);
        let quads = spec
            .outline
            .iter()
            .filter(|c| matches!(c, PathCmd::QuadTo(..)))
            .count();
        assert_eq!(quads, 4, "unpinned tail must not alter the outline");
    }

    #[test]
    fn text_only_has_no_outline() {
        let b = bubble(BubbleKind::TextOnly, 100.0, 50.0);
        assert!(generate_shape(&b).outline.is_empty());
    }

    #[test]
    fn thought_dots_become_circles() {
        let mut b = bubble(BubbleKind::Thought, 100.0, 80.0);
        b.parts.push(Part::Dot {
            offset_x: 20.0,
            offset_y: 90.0,
            size: 14.0,
        });
        b.parts.push(Part::Dot {
            offset_x: 10.0,
            offset_y: 105.0,
            size: 8.0,
        });
        let spec = generate_shape(&b);
        assert_eq!(spec.circles.len(), 2);
        assert_eq!(spec.circles[0].radius, 7.0);
        assert_eq!(spec.circles[1].id, 1);
    }
}
