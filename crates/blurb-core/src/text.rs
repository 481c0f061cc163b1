//! Rich-text segmentation and wrapping.
//!
//! Converts a markup `Document` into width-constrained `TextLine`s of
//! styled runs. Layout is a pure recomputation from the document and the
//! current geometry — nothing here is cached or incrementally updated.
//! Drawing the resulting lines is the render crate's job.

use crate::markup::{Document, Node, StylePatch};
use crate::model::Color;
use crate::safezone::TextExtent;

// ─── Styles and runs ─────────────────────────────────────────────────────

/// Resolved style for a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl TextStyle {
    pub fn new(font_family: &str, font_size: f32, color: Color) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            color,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }

    /// Apply a span's overrides on top of this (inherited) style.
    fn patched(&self, patch: &StylePatch) -> Self {
        let mut out = self.clone();
        out.bold |= patch.bold;
        out.italic |= patch.italic;
        out.underline |= patch.underline;
        out.strikethrough |= patch.strikethrough;
        if let Some(size) = patch.font_size {
            out.font_size = size;
        }
        if let Some(ref family) = patch.font_family {
            out.font_family = family.clone();
        }
        if let Some(color) = patch.color {
            out.color = color;
        }
        out
    }

    /// Stacking height of a line set in this style.
    pub fn line_height(&self) -> f32 {
        self.font_size + line_gap_offset(self.font_size)
    }
}

/// A contiguous run of text sharing one style, with its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub text: String,
    pub style: TextStyle,
    pub width: f32,
}

/// One wrapped line: ordered segments plus aggregate extents. `height` is
/// the max segment line-height on the line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub segments: Vec<TextSegment>,
    pub width: f32,
    pub height: f32,
}

impl TextLine {
    fn empty(height: f32) -> Self {
        TextLine {
            segments: Vec::new(),
            width: 0.0,
            height,
        }
    }
}

/// Text-measurement oracle. Implemented by drawing surfaces; tests use a
/// fixed per-character model.
pub trait TextMeasurer {
    /// Pixel width of `text` set in `style`.
    fn measure(&self, text: &str, style: &TextStyle) -> f32;
}

// ─── Line gap curve ──────────────────────────────────────────────────────

/// Piecewise-linear control points for the inter-line gap over the
/// 5–40px range: tightened at small sizes, opened up at large ones.
const GAP_CURVE: [(f32, f32); 5] = [
    (5.0, -3.0),
    (12.0, -1.5),
    (20.0, 0.0),
    (30.0, 2.5),
    (40.0, 5.0),
];

/// Offset added to the font size to get the stacking line height.
/// Monotonically non-decreasing; the reduction never exceeds 80% of the
/// nominal size.
pub fn line_gap_offset(font_size: f32) -> f32 {
    let size = font_size.clamp(GAP_CURVE[0].0, GAP_CURVE[GAP_CURVE.len() - 1].0);
    let mut offset = GAP_CURVE[GAP_CURVE.len() - 1].1;
    for pair in GAP_CURVE.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if size <= x1 {
            let t = if x1 > x0 { (size - x0) / (x1 - x0) } else { 0.0 };
            offset = y0 + t * (y1 - y0);
            break;
        }
    }
    offset.max(-0.8 * font_size)
}

// ─── Segmentation ────────────────────────────────────────────────────────

/// Flatten a document into paragraphs of styled runs. Each hard break
/// closes a paragraph; empty paragraphs survive (they become blank lines).
pub fn segment(doc: &Document, default: &TextStyle) -> Vec<Vec<(String, TextStyle)>> {
    let mut paragraphs = vec![Vec::new()];
    walk(&doc.nodes, default, &mut paragraphs);
    paragraphs
}

fn walk(nodes: &[Node], style: &TextStyle, paragraphs: &mut Vec<Vec<(String, TextStyle)>>) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                if !text.is_empty()
                    && let Some(paragraph) = paragraphs.last_mut()
                {
                    paragraph.push((text.clone(), style.clone()));
                }
            }
            Node::Break => paragraphs.push(Vec::new()),
            Node::Span { patch, children } => {
                let inner = style.patched(patch);
                walk(children, &inner, paragraphs);
            }
        }
    }
}

// ─── Wrapping ────────────────────────────────────────────────────────────

/// Wrap a document into lines no wider than `max_width`, or than the
/// per-row extent when one is supplied. `start_y` is where the block's
/// first line begins in the extent's coordinate space.
pub fn layout_text(
    doc: &Document,
    default: &TextStyle,
    max_width: f32,
    extent: Option<&TextExtent>,
    start_y: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut cursor_y = start_y;
    let blank_height = default.line_height();

    for paragraph in segment(doc, default) {
        if paragraph.is_empty() {
            lines.push(TextLine::empty(blank_height));
            cursor_y += blank_height;
            continue;
        }

        let mut wrapper = LineWrapper::new(max_width, extent, cursor_y, measurer);
        for (text, style) in &paragraph {
            for token in tokens(text) {
                wrapper.push_token(token, style);
            }
        }
        cursor_y = wrapper.finish(&mut lines, blank_height);
    }

    lines
}

/// Split into whitespace-preserving tokens: runs of spaces alternate with
/// runs of non-space characters.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let first_ws = rest.chars().next().is_some_and(char::is_whitespace);
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != first_ws)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}

struct LineWrapper<'a> {
    max_width: f32,
    extent: Option<&'a TextExtent>,
    cursor_y: f32,
    measurer: &'a dyn TextMeasurer,
    current: TextLine,
    done: Vec<TextLine>,
}

impl<'a> LineWrapper<'a> {
    fn new(
        max_width: f32,
        extent: Option<&'a TextExtent>,
        cursor_y: f32,
        measurer: &'a dyn TextMeasurer,
    ) -> Self {
        Self {
            max_width,
            extent,
            cursor_y,
            measurer,
            current: TextLine::empty(0.0),
            done: Vec::new(),
        }
    }

    /// Usable width for the line currently being filled.
    fn available(&self) -> f32 {
        match self.extent {
            Some(e) => e.at(self.cursor_y).min(self.max_width),
            None => self.max_width,
        }
    }

    fn push_token(&mut self, token: &str, style: &TextStyle) {
        let width = self.measurer.measure(token, style);
        let avail = self.available();

        if self.current.width + width <= avail {
            self.append(token, style, width);
            return;
        }

        // Leading whitespace on a fresh line is dropped, not wrapped.
        if token.trim().is_empty() {
            if !self.current.segments.is_empty() {
                self.break_line();
            }
            return;
        }

        if !self.current.segments.is_empty() {
            self.break_line();
        }

        let avail = self.available();
        if width <= avail {
            self.append(token, style, width);
        } else {
            self.push_broken(token, style);
        }
    }

    /// Greedy character breaking for a token wider than a whole line:
    /// grow a candidate substring while it still fits, else flush.
    fn push_broken(&mut self, token: &str, style: &TextStyle) {
        let mut candidate = String::new();
        for c in token.chars() {
            candidate.push(c);
            let width = self.measurer.measure(&candidate, style);
            if width > self.available() && candidate.chars().count() > 1 {
                candidate.pop();
                let flushed_width = self.measurer.measure(&candidate, style);
                self.append(&candidate, style, flushed_width);
                self.break_line();
                candidate = c.to_string();
            }
        }
        if !candidate.is_empty() {
            let width = self.measurer.measure(&candidate, style);
            self.append(&candidate, style, width);
        }
    }

    fn append(&mut self, text: &str, style: &TextStyle, width: f32) {
        self.current.width += width;
        self.current.height = self.current.height.max(style.line_height());
        // Merge into the previous segment when the style is unchanged.
        if let Some(last) = self.current.segments.last_mut()
            && last.style == *style
        {
            last.text.push_str(text);
            last.width += width;
            return;
        }
        self.current.segments.push(TextSegment {
            text: text.to_string(),
            style: style.clone(),
            width,
        });
    }

    fn break_line(&mut self) {
        self.trim_trailing_whitespace();
        let line = std::mem::replace(&mut self.current, TextLine::empty(0.0));
        self.cursor_y += line.height;
        self.done.push(line);
    }

    /// Trailing whitespace does not count against the line box.
    fn trim_trailing_whitespace(&mut self) {
        while let Some(last) = self.current.segments.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            if trimmed_len == last.text.len() {
                break;
            }
            last.text.truncate(trimmed_len);
            let new_width = if last.text.is_empty() {
                0.0
            } else {
                self.measurer.measure(&last.text, &last.style)
            };
            self.current.width += new_width - last.width;
            last.width = new_width;
            if last.text.is_empty() {
                self.current.segments.pop();
            } else {
                break;
            }
        }
        self.current.width = self.current.width.max(0.0);
    }

    /// Close the paragraph, returning the y cursor after its last line.
    fn finish(mut self, lines: &mut Vec<TextLine>, blank_height: f32) -> f32 {
        if self.current.segments.is_empty() && self.done.is_empty() {
            self.current.height = blank_height;
        }
        if !self.current.segments.is_empty() || self.done.is_empty() {
            self.break_line();
        }
        let y = self.cursor_y;
        lines.append(&mut self.done);
        y
    }
}

/// Total stacked height of a wrapped block.
pub fn block_height(lines: &[TextLine]) -> f32 {
    lines.iter().map(|l| l.height).sum()
}

/// Widest line in a wrapped block.
pub fn block_width(lines: &[TextLine]) -> f32 {
    lines.iter().map(|l| l.width).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;
    use pretty_assertions::assert_eq;

    /// Fixed-advance measurer: every char is 0.5 × font-size wide.
    pub(crate) struct CharGrid;

    impl TextMeasurer for CharGrid {
        fn measure(&self, text: &str, style: &TextStyle) -> f32 {
            text.chars().count() as f32 * style.font_size * 0.5
        }
    }

    fn style(size: f32) -> TextStyle {
        TextStyle::new("Arial", size, Color::BLACK)
    }

    #[test]
    fn gap_curve_is_monotonic() {
        let mut prev = f32::MIN;
        let mut size = 5.0;
        while size <= 40.0 {
            let gap = line_gap_offset(size);
            assert!(gap >= prev, "gap curve decreased at {size}");
            assert!(gap >= -0.8 * size);
            prev = gap;
            size += 0.5;
        }
    }

    #[test]
    fn single_word_single_line() {
        let doc = parse_markup("hello").unwrap();
        let lines = layout_text(&doc, &style(16.0), 200.0, None, 0.0, &CharGrid);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].segments[0].text, "hello");
        assert_eq!(lines[0].width, 5.0 * 8.0);
    }

    #[test]
    fn words_wrap_at_width() {
        // Each word is 32px at size 16; "aaaa bbbb cccc" = 112px total.
        let doc = parse_markup("aaaa bbbb cccc").unwrap();
        let lines = layout_text(&doc, &style(16.0), 80.0, None, 0.0, &CharGrid);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].segments[0].text, "aaaa bbbb");
        assert_eq!(lines[1].segments[0].text, "cccc");
    }

    #[test]
    fn overwide_token_breaks_by_char() {
        let doc = parse_markup("abcdefghij").unwrap();
        // 3 chars fit per 25px line at size 16 (8px/char).
        let lines = layout_text(&doc, &style(16.0), 25.0, None, 0.0, &CharGrid);
        assert!(lines.len() >= 3, "expected char-broken lines, got {lines:?}");
        assert_eq!(lines[0].segments[0].text, "abc");
        let rejoined: String = lines
            .iter()
            .flat_map(|l| l.segments.iter())
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(rejoined, "abcdefghij");
    }

    #[test]
    fn hard_break_produces_blank_line() {
        let doc = parse_markup("a\n\nb").unwrap();
        let lines = layout_text(&doc, &style(16.0), 200.0, None, 0.0, &CharGrid);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].segments.is_empty());
        assert!(lines[1].height > 0.0);
    }

    #[test]
    fn styled_runs_keep_boundaries() {
        let doc = parse_markup("ab[b]cd[/b]ef").unwrap();
        let lines = layout_text(&doc, &style(16.0), 500.0, None, 0.0, &CharGrid);
        assert_eq!(lines.len(), 1);
        let segs = &lines[0].segments;
        assert_eq!(segs.len(), 3);
        assert!(segs[1].style.bold);
        assert!(!segs[2].style.bold);
    }

    #[test]
    fn same_style_segments_merge() {
        let doc = parse_markup("one two").unwrap();
        let lines = layout_text(&doc, &style(16.0), 500.0, None, 0.0, &CharGrid);
        assert_eq!(lines[0].segments.len(), 1);
        assert_eq!(lines[0].segments[0].text, "one two");
    }

    #[test]
    fn line_height_tracks_largest_run() {
        let doc = parse_markup("a[size=32]B[/size]").unwrap();
        let lines = layout_text(&doc, &style(16.0), 500.0, None, 0.0, &CharGrid);
        let expected = 32.0 + line_gap_offset(32.0);
        assert_eq!(lines[0].height, expected);
    }

    #[test]
    fn extent_narrows_wrapping() {
        use crate::safezone::TextExtent;
        // Top rows are narrow, later rows are wide.
        let extent = TextExtent::Rows {
            top: 0.0,
            step: 20.0,
            widths: vec![40.0, 200.0, 200.0, 200.0],
        };
        let doc = parse_markup("aaaa bbbb cccc").unwrap();
        let lines = layout_text(&doc, &style(16.0), 500.0, Some(&extent), 0.0, &CharGrid);
        // First line constrained to 40px (one 32px word), rest fit together.
        assert_eq!(lines[0].segments[0].text, "aaaa");
        assert!(lines.len() >= 2);
    }

    #[test]
    fn plain_fallback_still_lays_out() {
        let doc = crate::markup::parse_or_plain("[b]broken");
        let lines = layout_text(&doc, &style(16.0), 500.0, None, 0.0, &CharGrid);
        assert_eq!(lines[0].segments[0].text, "[b]broken");
    }
}
