//! Parser for the bubble markup format → styled document tree.
//!
//! Built on `winnow` 0.7. The syntax is a small bracket-tag language the
//! editing surface emits as data — layout never inspects live editor
//! state, only this tree:
//!
//! ```text
//! plain [b]bold [i]bold-italic[/i][/b] [size=24]big[/size]
//! [color=#FF0000]red[/color] [font=Courier]mono[/font] line[br]break
//! ```
//!
//! Newlines and `[br]` are hard breaks. Styles cascade top-down and are
//! overridden only by the span introducing the change.

use crate::error::Error;
use crate::model::Color;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

// ─── Document model ──────────────────────────────────────────────────────

/// A parsed markup fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A literal text run.
    Text(String),
    /// A hard line break (`[br]` or a newline).
    Break,
    /// A styled span applying `patch` to everything beneath it.
    Span { patch: StylePatch, children: Vec<Node> },
}

/// Style overrides a span introduces. Boolean markers only ever switch a
/// flag on; size/family/color replace the inherited value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StylePatch {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
}

impl Document {
    /// A document holding one plain run (the MalformedMarkup fallback).
    pub fn plain(text: &str) -> Self {
        Document {
            nodes: vec![Node::Text(text.to_string())],
        }
    }

    /// Strip all styling: text content with breaks as newlines. This is
    /// what the font-size fitter measures.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_plain(&self.nodes, &mut out);
        out
    }
}

fn collect_plain(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Break => out.push('\n'),
            Node::Span { children, .. } => collect_plain(children, out),
        }
    }
}

// ─── Entry points ────────────────────────────────────────────────────────

/// Parse a markup string into a document tree.
pub fn parse_markup(input: &str) -> Result<Document, Error> {
    let mut rest = input;
    let nodes = parse_nodes(&mut rest, None)?;
    if !rest.is_empty() {
        return Err(Error::MalformedMarkup(format!(
            "trailing input at '{}'",
            truncate(rest)
        )));
    }
    Ok(Document { nodes })
}

/// Parse, falling back to a single plain-text run on malformed input.
/// The editor must always render *something*, so this never fails.
pub fn parse_or_plain(input: &str) -> Document {
    match parse_markup(input) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("{err}; rendering as plain text");
            Document::plain(input)
        }
    }
}

fn truncate(s: &str) -> &str {
    let end = s
        .char_indices()
        .nth(24)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

// ─── Recursive descent ───────────────────────────────────────────────────

/// Parse nodes until end of input (closing = None) or until the named
/// closing tag is consumed.
fn parse_nodes(input: &mut &str, closing: Option<&str>) -> Result<Vec<Node>, Error> {
    let mut nodes = Vec::new();

    loop {
        if input.is_empty() {
            return match closing {
                Some(tag) => Err(Error::MalformedMarkup(format!("unclosed tag [{tag}]"))),
                None => Ok(nodes),
            };
        }

        if let Some(rest) = input.strip_prefix("[/") {
            let mut r = rest;
            let name = parse_tag_name(&mut r)?;
            let r = r
                .strip_prefix(']')
                .ok_or_else(|| Error::MalformedMarkup(format!("unterminated close tag [/{name}")))?;
            return match closing {
                Some(tag) if tag == name => {
                    *input = r;
                    Ok(nodes)
                }
                Some(tag) => Err(Error::MalformedMarkup(format!(
                    "mismatched close tag [/{name}], expected [/{tag}]"
                ))),
                None => Err(Error::MalformedMarkup(format!(
                    "stray close tag [/{name}]"
                ))),
            };
        }

        if input.starts_with('[') {
            *input = &input[1..];
            let name = parse_tag_name(input)?;
            let value = parse_tag_value(input)?;
            *input = input
                .strip_prefix(']')
                .ok_or_else(|| Error::MalformedMarkup(format!("unterminated tag [{name}")))?;

            if name == "br" {
                nodes.push(Node::Break);
                continue;
            }

            let patch = tag_patch(name, value.as_deref())?;
            let children = parse_nodes(input, Some(name))?;
            nodes.push(Node::Span { patch, children });
            continue;
        }

        if let Some(rest) = input.strip_prefix('\n') {
            *input = rest;
            nodes.push(Node::Break);
            continue;
        }

        // Literal text up to the next tag or newline.
        let text: Result<&str, ErrMode<ContextError>> =
            take_till(1.., ['[', '\n']).parse_next(input);
        match text {
            Ok(t) => nodes.push(Node::Text(t.to_string())),
            Err(_) => {
                return Err(Error::MalformedMarkup(format!(
                    "unexpected input at '{}'",
                    truncate(input)
                )));
            }
        }
    }
}

fn parse_tag_name<'a>(input: &mut &'a str) -> Result<&'a str, Error> {
    let name: Result<&str, ErrMode<ContextError>> =
        take_while(1.., |c: char| c.is_ascii_alphanumeric()).parse_next(input);
    name.map_err(|_| Error::MalformedMarkup(format!("expected tag name at '{}'", truncate(input))))
}

/// Optional `=value` portion of a tag. The value runs to the closing `]`.
fn parse_tag_value(input: &mut &str) -> Result<Option<String>, Error> {
    if let Some(rest) = input.strip_prefix('=') {
        *input = rest;
        let value: Result<&str, ErrMode<ContextError>> = take_till(1.., ']').parse_next(input);
        return value
            .map(|v| Some(v.to_string()))
            .map_err(|_| Error::MalformedMarkup("empty tag value".into()));
    }
    Ok(None)
}

fn tag_patch(name: &str, value: Option<&str>) -> Result<StylePatch, Error> {
    let mut patch = StylePatch::default();
    match (name, value) {
        ("b", None) => patch.bold = true,
        ("i", None) => patch.italic = true,
        ("u", None) => patch.underline = true,
        ("s", None) => patch.strikethrough = true,
        ("size", Some(v)) => {
            let size: f32 = v
                .parse()
                .map_err(|_| Error::MalformedMarkup(format!("bad size '{v}'")))?;
            if !(size > 0.0) {
                return Err(Error::MalformedMarkup(format!("bad size '{v}'")));
            }
            patch.font_size = Some(size);
        }
        ("font", Some(v)) => patch.font_family = Some(v.to_string()),
        ("color", Some(v)) => {
            patch.color = Some(
                Color::from_hex(v)
                    .ok_or_else(|| Error::MalformedMarkup(format!("bad color '{v}'")))?,
            );
        }
        _ => {
            return Err(Error::MalformedMarkup(format!("unknown tag [{name}]")));
        }
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_passthrough() {
        let doc = parse_markup("hello world").unwrap();
        assert_eq!(doc.nodes, vec![Node::Text("hello world".into())]);
    }

    #[test]
    fn bold_span() {
        let doc = parse_markup("a [b]bold[/b] z").unwrap();
        assert_eq!(doc.nodes.len(), 3);
        match &doc.nodes[1] {
            Node::Span { patch, children } => {
                assert!(patch.bold);
                assert_eq!(children, &vec![Node::Text("bold".into())]);
            }
            other => panic!("expected span, got {other:?}"),
        }
    }

    #[test]
    fn nested_spans_cascade() {
        let doc = parse_markup("[b][i]x[/i][/b]").unwrap();
        match &doc.nodes[0] {
            Node::Span { patch, children } => {
                assert!(patch.bold);
                match &children[0] {
                    Node::Span { patch, .. } => assert!(patch.italic),
                    other => panic!("expected inner span, got {other:?}"),
                }
            }
            other => panic!("expected span, got {other:?}"),
        }
    }

    #[test]
    fn size_font_color_values() {
        let doc = parse_markup("[size=24][font=Courier][color=#FF0000]x[/color][/font][/size]")
            .unwrap();
        let Node::Span { patch, children } = &doc.nodes[0] else {
            panic!("expected span");
        };
        assert_eq!(patch.font_size, Some(24.0));
        let Node::Span { patch, children } = &children[0] else {
            panic!("expected font span");
        };
        assert_eq!(patch.font_family.as_deref(), Some("Courier"));
        let Node::Span { patch, .. } = &children[0] else {
            panic!("expected color span");
        };
        assert_eq!(patch.color, Color::from_hex("#FF0000"));
    }

    #[test]
    fn breaks_from_br_and_newline() {
        let doc = parse_markup("a[br]b\nc").unwrap();
        let breaks = doc.nodes.iter().filter(|n| matches!(n, Node::Break)).count();
        assert_eq!(breaks, 2);
        assert_eq!(doc.plain_text(), "a\nb\nc");
    }

    #[test]
    fn unclosed_tag_is_malformed() {
        assert!(matches!(
            parse_markup("[b]oops"),
            Err(Error::MalformedMarkup(_))
        ));
    }

    #[test]
    fn mismatched_close_is_malformed() {
        assert!(parse_markup("[b]x[/i]").is_err());
    }

    #[test]
    fn unknown_tag_is_malformed() {
        assert!(parse_markup("[blink]x[/blink]").is_err());
    }

    #[test]
    fn fallback_yields_single_plain_run() {
        let doc = parse_or_plain("[b]broken");
        assert_eq!(doc.nodes, vec![Node::Text("[b]broken".into())]);
    }

    #[test]
    fn bad_color_rejected() {
        assert!(parse_markup("[color=#XYZ]x[/color]").is_err());
    }
}
