//! Boundary errors.
//!
//! Almost nothing in the core fails: geometry is clamped, markup falls
//! back to a plain run, the fitter reports `fits = false`. The variants
//! here are the few conditions a caller genuinely has to handle.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The markup fragment could not be parsed. Layout recovers from this
    /// internally (plain-text fallback); the variant exists so callers who
    /// parse eagerly (e.g. on paste) can report it.
    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    /// The font resolver could not produce any usable family.
    #[error("font resolution failed for '{0}'")]
    FontResolution(String),

    /// The drawing surface rejected the draw pass.
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,

    /// A project record had an unknown schema version.
    #[error("unsupported project schema version {0}")]
    UnsupportedSchema(u32),

    /// A project record could not be decoded at all.
    #[error("invalid project record: {0}")]
    InvalidProject(String),
}
