use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide id counter. Starts at 1 so 0 can never collide with an
/// allocated id (useful as a sentinel in callers).
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// A lightweight numeric identifier for bubbles.
///
/// The raw value doubles as the silhouette PRNG seed, so ids must stay
/// stable across save/load — `reserve` keeps the allocator ahead of any
/// ids read back from a project file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(u64);

impl BubbleId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        BubbleId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an existing raw id (from a loaded project).
    pub const fn from_raw(raw: u64) -> Self {
        BubbleId(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Bump the allocator past `raw` so future `next()` calls cannot
    /// collide with ids loaded from persisted state.
    pub fn reserve(raw: u64) {
        COUNTER.fetch_max(raw + 1, Ordering::Relaxed);
    }
}

impl fmt::Debug for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serialize for BubbleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for BubbleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Ok(BubbleId(raw))
    }
}
