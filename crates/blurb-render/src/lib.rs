//! Rendering for bubble overlays: an abstract drawing surface, the paint
//! pass that turns bubbles into fill/stroke/text operations, and hit
//! testing for the interaction layer. No GPU or windowing code lives
//! here — a `Surface` implementation supplies the actual backend.

pub mod hit;
pub mod paint;
pub mod surface;
pub mod text;

pub use hit::{Handle, HitTarget, hit_test};
pub use paint::paint_scene;
pub use surface::{DrawOp, RecordingSurface, Surface};
