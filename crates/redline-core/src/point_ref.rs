//! Tracked point references — positions that survive structural edits.
//!
//! A [`PointRef`] is a handle into the document's registry of live
//! positions.  Every primitive transform rebases all registered points, so
//! a ref taken before a sequence of mutations still resolves to the
//! equivalent position afterwards, where a raw [`Point`] snapshot would
//! have gone stale.

use crate::path::Point;

/// Handle to a tracked position.  Cheap to copy; owned by the caller and
/// released with `untrack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointRef(usize);

/// Arena of live tracked positions.
#[derive(Debug, Clone, Default)]
pub struct PointRegistry {
    slots: Vec<Option<Point>>,
}

impl PointRegistry {
    /// Start tracking `point`, returning a handle to it.
    pub fn track(&mut self, point: Point) -> PointRef {
        if let Some(free) = self.slots.iter().position(Option::is_none) {
            self.slots[free] = Some(point);
            PointRef(free)
        } else {
            self.slots.push(Some(point));
            PointRef(self.slots.len() - 1)
        }
    }

    /// Current (rebased) position of a tracked ref.
    pub fn get(&self, r: PointRef) -> Option<&Point> {
        self.slots.get(r.0).and_then(Option::as_ref)
    }

    /// Stop tracking and return the final position.
    pub fn untrack(&mut self, r: PointRef) -> Option<Point> {
        self.slots.get_mut(r.0).and_then(Option::take)
    }

    /// Number of live refs.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn for_each_mut(&mut self, f: impl Fn(&mut Point)) {
        for slot in self.slots.iter_mut().flatten() {
            f(slot);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
