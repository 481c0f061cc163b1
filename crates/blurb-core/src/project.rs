//! Project persistence.
//!
//! A project record is the JSON snapshot of one editing session: the
//! background image reference, the canvas dimensions, every bubble, and
//! the tool defaults. Records are versioned; loading sanitizes each
//! bubble and advances the id counter so freshly created bubbles never
//! collide with loaded ones.

use crate::error::Error;
use crate::id::BubbleId;
use crate::model::{Bubble, ToolSettings};
use serde::{Deserialize, Serialize};

/// Current record schema. Bump on breaking layout changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub schema_version: u32,
    /// Background image reference (path or data URL); None for a blank
    /// canvas.
    pub image: Option<String>,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub bubbles: Vec<Bubble>,
    pub settings: ToolSettings,
    /// Next z-index to hand out; kept so stacking survives reload.
    pub next_z: i32,
}

impl ProjectRecord {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            image: None,
            canvas_width,
            canvas_height,
            bubbles: Vec::new(),
            settings: ToolSettings::default(),
            next_z: 0,
        }
    }

    /// Serialize to a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidProject(e.to_string()))
    }

    /// Decode and repair a record. Bubbles from any producer are accepted:
    /// sizes are clamped and unsupported parts dropped rather than the
    /// load being rejected.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let mut record: ProjectRecord =
            serde_json::from_str(json).map_err(|e| Error::InvalidProject(e.to_string()))?;
        if record.schema_version != SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema(record.schema_version));
        }
        for bubble in &mut record.bubbles {
            bubble.sanitize();
        }
        if let Some(max) = record.bubbles.iter().map(|b| b.id.raw()).max() {
            BubbleId::reserve(max);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BubbleKind, Part};
    use pretty_assertions::assert_eq;

    fn sample() -> ProjectRecord {
        let mut record = ProjectRecord::new(800.0, 600.0);
        record.image = Some("page-04.png".into());
        let mut b = Bubble::new(BubbleId::from_raw(3), BubbleKind::SpeechDown, 10.0, 20.0, 150.0, 90.0);
        b.text = "[b]Hey![/b]".into();
        b.parts.push(Part::new_tail(75.0, 90.0, 20.0, 75.0, 120.0));
        record.bubbles.push(b);
        record.next_z = 1;
        record
    }

    #[test]
    fn json_roundtrip() {
        let record = sample();
        let json = record.to_json().unwrap();
        let back = ProjectRecord::from_json(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn unknown_schema_rejected() {
        let mut record = sample();
        record.schema_version = 99;
        let json = record.to_json().unwrap();
        assert_eq!(
            ProjectRecord::from_json(&json),
            Err(Error::UnsupportedSchema(99))
        );
    }

    #[test]
    fn garbage_is_invalid_project() {
        assert!(matches!(
            ProjectRecord::from_json("not json"),
            Err(Error::InvalidProject(_))
        ));
    }

    #[test]
    fn load_sanitizes_bubbles() {
        let mut record = sample();
        // A dot on a speech bubble is illegal and must be dropped on load.
        record.bubbles[0].parts.push(Part::Dot {
            offset_x: 5.0,
            offset_y: 5.0,
            size: 8.0,
        });
        record.bubbles[0].width = 1.0;
        let json = record.to_json().unwrap();
        let back = ProjectRecord::from_json(&json).unwrap();
        assert_eq!(back.bubbles[0].parts.len(), 1);
        assert!(back.bubbles[0].parts[0].is_tail());
        assert_eq!(back.bubbles[0].width, crate::model::MIN_BUBBLE_WIDTH);
    }

    #[test]
    fn load_reserves_ids() {
        let mut record = sample();
        record.bubbles[0].id = BubbleId::from_raw(10_000);
        let json = record.to_json().unwrap();
        ProjectRecord::from_json(&json).unwrap();
        assert!(BubbleId::next().raw() > 10_000);
    }
}
