//! Core engine for bubble overlays: data model, parametric shape-path
//! generation, safe-text-zone computation, markup parsing, rich-text
//! layout, and the auto-fit font-size search. Everything here is pure —
//! rendering and interaction live in the companion crates.

pub mod error;
pub mod fit;
pub mod id;
pub mod markup;
pub mod model;
pub mod project;
pub mod safezone;
pub mod shape;
pub mod text;

pub use error::Error;
pub use fit::{FitResult, fit_font_size};
pub use id::BubbleId;
pub use model::*;
pub use project::ProjectRecord;
pub use safezone::{SafeZone, TextExtent, compute_safe_zone, text_extent};
pub use shape::{AuxCircle, ShapeSpec, generate_shape};
pub use text::{TextLine, TextMeasurer, TextSegment, TextStyle, layout_text};
