//! Input model: keys, selection references, and the editor mode machine.
//!
//! `Mode` is the explicit `{Idle, Drawing, Dragging}` state of the editor.
//! A drag remembers whether it started mid-drawing so pointer-up can resume
//! the drawing session. The selected vertex is addressed by stable zone id
//! and resolved against the zone set on every access, so index shifts from
//! deletions never leave it pointing at the wrong vertex.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{ZoneId, ZoneSet};
use crate::geom::Point;

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// `Delete` or `Backspace`.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Weak reference to one vertex: the owning zone's id plus the point index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRef {
    pub zone_id: ZoneId,
    pub index: usize,
}

impl PointRef {
    /// Resolve to `(zone_index, point_index)` if the vertex still exists.
    #[must_use]
    pub fn resolve(&self, zones: &ZoneSet) -> Option<(usize, usize)> {
        let zone_index = zones.index_of(&self.zone_id)?;
        let zone = zones.get(zone_index)?;
        (self.index < zone.points.len()).then_some((zone_index, self.index))
    }
}

/// What the editor returns to when a drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Idle,
    Drawing,
}

/// Editor mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Clicks off a vertex start a new zone.
    #[default]
    Idle,
    /// Clicks off a vertex append to the active zone.
    Drawing,
    /// A vertex is following the pointer between pointer-down and pointer-up.
    Dragging {
        /// The vertex being dragged.
        point: PointRef,
        /// State to return to on pointer-up.
        resume: Resume,
    },
}

impl Mode {
    /// Whether new-point clicks append to the active zone (now or after the current drag).
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing | Self::Dragging { resume: Resume::Drawing, .. })
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// The mode to enter when the current drag (if any) ends.
    #[must_use]
    pub fn after_drag(&self) -> Self {
        match self {
            Self::Dragging { resume: Resume::Drawing, .. } | Self::Drawing => Self::Drawing,
            Self::Dragging { resume: Resume::Idle, .. } | Self::Idle => Self::Idle,
        }
    }

    /// The [`Resume`] target for a drag starting from this mode.
    #[must_use]
    pub fn resume_target(&self) -> Resume {
        if self.is_drawing() { Resume::Drawing } else { Resume::Idle }
    }
}

/// Transient editor state visible to the renderer. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct EditorUi {
    /// Index of the zone being edited or highlighted as active.
    pub active_zone: usize,
    /// The selected vertex, if any. Kept after a drag ends so Delete can remove it.
    pub selected: Option<PointRef>,
    /// Last known pointer position over the surface.
    pub pointer: Option<Point>,
    /// Closed zone under the pointer, if any.
    pub hovered_zone: Option<usize>,
}
